/// Shared embed builders
use poise::serenity_prelude::{
    Colour, CreateEmbed, CreateEmbedAuthor, Timestamp,
};

use super::messages::redeem_progress_lines;

/// Red error embed used by the command error handler
pub fn error_embed(description: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("Error Occurred")
        .description(description)
        .colour(Colour::RED)
}

/// Mention line prepended to a scheduled announcement.
///
/// `-1` means everyone; any other id is a role mention.
pub fn mention_line(mention: Option<i64>) -> Option<String> {
    match mention {
        Some(-1) => Some("@everyone".to_string()),
        Some(role_id) => Some(format!("<@&{}>", role_id)),
        None => None,
    }
}

/// Blue announcement embed posted by the announcer loop.
///
/// The timestamp is the scheduled instant, not the posting instant.
pub fn announcement_embed(
    title: &str,
    content: Option<&str>,
    image: Option<&str>,
    author_name: &str,
    author_icon: &str,
    scheduled_unix: i64,
) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(title)
        .colour(Colour::BLUE)
        .author(CreateEmbedAuthor::new(author_name).icon_url(author_icon));

    if let Some(content) = content {
        embed = embed.description(content);
    }
    if let Some(image) = image {
        embed = embed.image(image);
    }
    if let Ok(ts) = Timestamp::from_unix_timestamp(scheduled_unix) {
        embed = embed.timestamp(ts);
    }

    embed
}

/// Green status embed for the mass-redeem flow
pub fn redeem_embed(
    phase: &str,
    code: &str,
    total: usize,
    success: usize,
    already: usize,
    fail: usize,
    note: Option<&str>,
) -> CreateEmbed {
    let mut description = format!(
        "Code: `{}`\nIncluded accounts: {}\n{}",
        code,
        total,
        redeem_progress_lines(total, success, already, fail)
    );
    if let Some(note) = note {
        description.push('\n');
        description.push_str(note);
    }

    CreateEmbed::new()
        .title(format!("Mass Redeem - {}", phase))
        .description(description)
        .colour(Colour::new(0x00FF00))
        .timestamp(Timestamp::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_line_everyone() {
        assert_eq!(mention_line(Some(-1)), Some("@everyone".to_string()));
    }

    #[test]
    fn test_mention_line_role() {
        assert_eq!(mention_line(Some(42)), Some("<@&42>".to_string()));
    }

    #[test]
    fn test_mention_line_none() {
        assert_eq!(mention_line(None), None);
    }
}
