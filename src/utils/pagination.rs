/// Embed pager state and navigation row building
use poise::serenity_prelude::{ButtonStyle, CreateActionRow, CreateButton, CreateEmbed};

/// Custom id of the previous-page button
pub const PAGER_PREV: &str = "pager_prev";
/// Custom id of the next-page button
pub const PAGER_NEXT: &str = "pager_next";

/// One page of a paginated message: an embed plus an optional page-specific
/// component row (e.g. the event select of that page)
#[derive(Clone)]
pub struct PagerPage {
    pub embed: CreateEmbed,
    pub extra_row: Option<CreateActionRow>,
}

/// In-memory pager state parked per message
#[derive(Clone)]
pub struct Pager {
    pages: Vec<PagerPage>,
    current: usize,
}

impl Pager {
    pub fn new(pages: Vec<PagerPage>) -> Self {
        Self { pages, current: 0 }
    }

    /// Move one page forward; returns false when already on the last page
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.pages.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Move one page back; returns false when already on the first page
    pub fn prev(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn current_page(&self) -> &PagerPage {
        &self.pages[self.current]
    }

    /// Component rows for the current page: the page's own row (when any)
    /// followed by the navigation row
    pub fn rows(&self) -> Vec<CreateActionRow> {
        let page = self.current_page();
        let mut rows = Vec::new();
        if let Some(extra) = &page.extra_row {
            rows.push(extra.clone());
        }
        if self.pages.len() > 1 {
            rows.push(nav_row(self.current, self.pages.len()));
        }
        rows
    }
}

/// Number of pages needed for `total` items at `per_page` each (at least 1)
pub fn page_count(total: usize, per_page: usize) -> usize {
    if total == 0 {
        return 1;
    }
    total.div_ceil(per_page)
}

/// Build the prev / counter / next navigation row
pub fn nav_row(current: usize, count: usize) -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(PAGER_PREV)
            .label("◀")
            .style(ButtonStyle::Secondary)
            .disabled(current == 0),
        CreateButton::new("pager_counter")
            .label(format!("{} / {}", current + 1, count))
            .style(ButtonStyle::Secondary)
            .disabled(true),
        CreateButton::new(PAGER_NEXT)
            .label("▶")
            .style(ButtonStyle::Secondary)
            .disabled(current + 1 >= count),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pager(pages: usize) -> Pager {
        Pager::new(
            (0..pages)
                .map(|i| PagerPage {
                    embed: CreateEmbed::new().title(format!("page {}", i)),
                    extra_row: None,
                })
                .collect(),
        )
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 5), 1);
        assert_eq!(page_count(1, 5), 1);
        assert_eq!(page_count(5, 5), 1);
        assert_eq!(page_count(6, 5), 2);
        assert_eq!(page_count(11, 5), 3);
    }

    #[test]
    fn test_pager_navigation_clamps_at_ends() {
        let mut pager = pager(3);
        assert!(!pager.prev());
        assert_eq!(pager.current, 0);

        assert!(pager.next());
        assert!(pager.next());
        assert_eq!(pager.current, 2);

        assert!(!pager.next());
        assert_eq!(pager.current, 2);

        assert!(pager.prev());
        assert_eq!(pager.current, 1);
    }

    #[test]
    fn test_single_page_has_no_nav_row() {
        assert!(pager(1).rows().is_empty());
        assert_eq!(pager(2).rows().len(), 1);
    }
}
