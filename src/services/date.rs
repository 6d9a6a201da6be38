//! Display formatting for caption dates.

use chrono::NaiveDate;

/// Format `YYYY-MM-DD` as `June 1, 2024`.
///
/// Empty input stays empty; anything that is not an ISO date is returned as
/// given, so callers can pass pre-formatted text straight through.
pub fn format_display_date(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_dates() {
        assert_eq!(format_display_date("2024-06-01"), "June 1, 2024");
        assert_eq!(format_display_date("1999-12-31"), "December 31, 1999");
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(format_display_date(""), "");
        assert_eq!(format_display_date("   "), "");
        assert_eq!(format_display_date("Summer 2020"), "Summer 2020");
        assert_eq!(format_display_date("2024-02-30"), "2024-02-30");
    }
}
