/// Pure date/time utility functions (Discord-agnostic)
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

/// Error returned for unparseable start date strings
#[derive(Debug, PartialEq, Eq)]
pub struct InvalidDatetime;

impl std::fmt::Display for InvalidDatetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid date format. Please use DD/MM HH:MM or HH:MM (UTC)")
    }
}

impl std::error::Error for InvalidDatetime {}

/// Current unix timestamp in seconds
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Parse a `DD/MM HH:MM` or bare `HH:MM` string as a UTC instant.
///
/// Bare times resolve against the date of `now`; dated strings resolve
/// against the year of `now`.
pub fn parse_datetime(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, InvalidDatetime> {
    let input = input.trim();

    if let Some((date_part, time_part)) = input.split_once(' ') {
        if !date_part.contains('/') {
            return Err(InvalidDatetime);
        }
        let (day, month) = date_part.split_once('/').ok_or(InvalidDatetime)?;
        let day: u32 = day.parse().map_err(|_| InvalidDatetime)?;
        let month: u32 = month.parse().map_err(|_| InvalidDatetime)?;
        let time = NaiveTime::parse_from_str(time_part, "%H:%M").map_err(|_| InvalidDatetime)?;
        let date = NaiveDate::from_ymd_opt(now.year(), month, day).ok_or(InvalidDatetime)?;
        Ok(Utc.from_utc_datetime(&date.and_time(time)))
    } else {
        let time = NaiveTime::parse_from_str(input, "%H:%M").map_err(|_| InvalidDatetime)?;
        Ok(Utc.from_utc_datetime(&now.date_naive().and_time(time)))
    }
}

/// Discord `<t:..:f>` timestamp marker with relative form underneath
pub fn discord_timestamp(unix: i64) -> String {
    format!("<t:{}:f>\n<t:{}:R>", unix, unix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_datetime_with_date() {
        let parsed = parse_datetime("20/07 18:30", fixed_now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 7, 20, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_datetime_time_only_uses_today() {
        let parsed = parse_datetime("08:15", fixed_now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 6, 15, 8, 15, 0).unwrap());
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("tomorrow", fixed_now()).is_err());
        assert!(parse_datetime("32/01 10:00", fixed_now()).is_err());
        assert!(parse_datetime("15/13 10:00", fixed_now()).is_err());
        assert!(parse_datetime("15/06 25:00", fixed_now()).is_err());
        assert!(parse_datetime("", fixed_now()).is_err());
    }

    #[test]
    fn test_discord_timestamp() {
        assert_eq!(discord_timestamp(1_700_000_000), "<t:1700000000:f>\n<t:1700000000:R>");
    }
}
