/// Parsing and formatting of `1w 2d 3h 4m` interval strings

/// Error returned when an interval string contains no usable time chunks
#[derive(Debug, PartialEq, Eq)]
pub struct InvalidInterval;

impl std::fmt::Display for InvalidInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid time format. Please use the format: 1w 2d 3h 4m")
    }
}

impl std::error::Error for InvalidInterval {}

const WEEK: i64 = 604_800;
const DAY: i64 = 86_400;
const HOUR: i64 = 3_600;
const MINUTE: i64 = 60;

fn unit_seconds(unit: char) -> Option<i64> {
    match unit {
        'w' => Some(WEEK),
        'd' => Some(DAY),
        'h' => Some(HOUR),
        'm' => Some(MINUTE),
        _ => None,
    }
}

/// Parse an interval string like `1w 2d 3h 4m` into seconds.
///
/// Chunks that do not follow the `<number><unit>` shape are skipped;
/// the string is rejected only when no chunk parses at all.
pub fn parse_interval(interval: &str) -> Result<i64, InvalidInterval> {
    let mut total = 0i64;
    let mut any = false;

    for chunk in interval.split_whitespace() {
        if chunk.len() < 2 {
            continue;
        }
        let unit = chunk.chars().last().unwrap_or(' ');
        let Some(seconds) = unit_seconds(unit) else {
            continue;
        };
        let Ok(value) = chunk[..chunk.len() - 1].parse::<i64>() else {
            continue;
        };
        if value < 0 {
            continue;
        }
        // User input reaches this unchecked; an absurd value must not wrap
        total = value
            .checked_mul(seconds)
            .and_then(|chunk| total.checked_add(chunk))
            .ok_or(InvalidInterval)?;
        any = true;
    }

    if any && total > 0 {
        Ok(total)
    } else {
        Err(InvalidInterval)
    }
}

/// Format seconds back into the `1w 2d 3h 4m` shape, omitting zero units
pub fn format_interval(seconds: i64) -> String {
    if seconds <= 0 {
        return "0m".to_string();
    }

    let mut remaining = seconds;
    let mut parts = Vec::new();
    for (unit, size) in [('w', WEEK), ('d', DAY), ('h', HOUR), ('m', MINUTE)] {
        let value = remaining / size;
        if value > 0 {
            parts.push(format!("{}{}", value, unit));
            remaining -= value * size;
        }
    }

    if parts.is_empty() {
        // Sub-minute intervals round down to nothing; show seconds raw
        return format!("{}s", seconds);
    }
    parts.join(" ")
}

/// Spell an interval out in words, e.g. `1 week 2 days 5 minutes`
pub fn interval_to_words(seconds: i64) -> String {
    if seconds <= 0 {
        return "0 minutes".to_string();
    }

    let mut remaining = seconds;
    let mut parts = Vec::new();
    for (singular, plural, size) in [
        ("week", "weeks", WEEK),
        ("day", "days", DAY),
        ("hour", "hours", HOUR),
        ("minute", "minutes", MINUTE),
    ] {
        let value = remaining / size;
        if value > 0 {
            let word = if value == 1 { singular } else { plural };
            parts.push(format!("{} {}", value, word));
            remaining -= value * size;
        }
    }

    if parts.is_empty() {
        return format!("{} seconds", seconds);
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval_full_form() {
        assert_eq!(parse_interval("1w 2d 3h 4m"), Ok(604_800 + 172_800 + 10_800 + 240));
    }

    #[test]
    fn test_parse_interval_single_unit() {
        assert_eq!(parse_interval("5m"), Ok(300));
        assert_eq!(parse_interval("1h"), Ok(3_600));
        assert_eq!(parse_interval("2d"), Ok(172_800));
    }

    #[test]
    fn test_parse_interval_skips_garbage_chunks() {
        assert_eq!(parse_interval("abc 10m xyz"), Ok(600));
        assert_eq!(parse_interval("5x 10m"), Ok(600));
    }

    #[test]
    fn test_parse_interval_rejects_unusable_input() {
        assert_eq!(parse_interval(""), Err(InvalidInterval));
        assert_eq!(parse_interval("soon"), Err(InvalidInterval));
        assert_eq!(parse_interval("0m"), Err(InvalidInterval));
        assert_eq!(parse_interval("-5m"), Err(InvalidInterval));
    }

    #[test]
    fn test_parse_interval_rejects_overflowing_values() {
        assert_eq!(parse_interval("9000000000000000w"), Err(InvalidInterval));
        assert_eq!(parse_interval("9223372036854775807m"), Err(InvalidInterval));
        // Each chunk fits on its own; their sum does not
        assert_eq!(
            parse_interval("15250284452w 15250284452w"),
            Err(InvalidInterval)
        );
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(300), "5m");
        assert_eq!(format_interval(604_800 + 172_800 + 10_800 + 240), "1w 2d 3h 4m");
        assert_eq!(format_interval(86_400), "1d");
        assert_eq!(format_interval(0), "0m");
        assert_eq!(format_interval(30), "30s");
    }

    #[test]
    fn test_parse_format_round_trip() {
        let seconds = parse_interval("2w 3h").unwrap();
        assert_eq!(format_interval(seconds), "2w 3h");
    }

    #[test]
    fn test_interval_to_words() {
        assert_eq!(interval_to_words(300), "5 minutes");
        assert_eq!(interval_to_words(60), "1 minute");
        assert_eq!(interval_to_words(90_000), "1 day 1 hour");
        assert_eq!(interval_to_words(0), "0 minutes");
    }
}
