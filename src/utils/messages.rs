/// Pure functions for formatting error and success messages (Discord-agnostic)

/// Format a validation error message with emoji
pub fn format_error(message: &str) -> String {
    format!("❌ {}", message)
}

/// Format a success message with emoji
pub fn format_success(message: &str) -> String {
    format!("✅ {}", message)
}

/// Format a warning message with emoji
pub fn format_warning(message: &str) -> String {
    format!("⚠️ {}", message)
}

/// Format an info message with emoji
pub fn format_info(message: &str) -> String {
    format!("ℹ️ {}", message)
}

/// Progress line of the mass-redeem embed
pub fn redeem_progress_lines(total: usize, success: usize, already: usize, fail: usize) -> String {
    format!(
        "━━━━━━━━━━━━━━━━━━━━━━\n\
         ✅ {} / {} Success\n\
         ❗ {} / {} Already Redeemed\n\
         ❌ {} / {} Fail\n\
         ━━━━━━━━━━━━━━━━━━━━━━",
        success, total, already, total, fail, total
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error() {
        assert_eq!(format_error("Something failed"), "❌ Something failed");
    }

    #[test]
    fn test_format_success() {
        assert_eq!(format_success("It worked"), "✅ It worked");
    }

    #[test]
    fn test_format_warning() {
        assert_eq!(format_warning("Be careful"), "⚠️ Be careful");
    }

    #[test]
    fn test_format_info() {
        assert_eq!(format_info("Good to know"), "ℹ️ Good to know");
    }

    #[test]
    fn test_redeem_progress_lines() {
        let lines = redeem_progress_lines(10, 3, 2, 1);
        assert!(lines.contains("✅ 3 / 10 Success"));
        assert!(lines.contains("❗ 2 / 10 Already Redeemed"));
        assert!(lines.contains("❌ 1 / 10 Fail"));
    }
}
