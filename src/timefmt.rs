//! Formatting and parsing helpers for the `mm:ss` work-time notation and
//! display dates.

use chrono::{DateTime, NaiveDate, Utc};

/// Format a second count as zero-padded `mm:ss`
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parse `mm:ss` strictly. The seconds component must stay below 60;
/// anything malformed is `None` so the caller can reject the input.
pub fn parse_time_spent(raw: &str) -> Option<u64> {
    let (mins, secs) = raw.split_once(':')?;
    let mins: u64 = mins.parse().ok()?;
    let secs: u64 = secs.parse().ok()?;
    if secs >= 60 {
        return None;
    }
    Some(mins * 60 + secs)
}

/// Lenient `mm:ss` conversion: malformed input collapses to 0
pub fn convert_to_seconds(raw: &str) -> u64 {
    parse_time_spent(raw).unwrap_or(0)
}

/// Format a timestamp for detail views, `MM-DD-YYYY`
pub fn format_display_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(dt) => dt.format("%m-%d-%Y").to_string(),
        None => "N/A".to_string(),
    }
}

/// Format a calendar date for detail views, `MM-DD-YYYY`
pub fn format_display_day(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%m-%d-%Y").to_string(),
        None => "N/A".to_string(),
    }
}

/// Wall-clock time since a timestamp as `hh:mm`
pub fn elapsed_hhmm(since: DateTime<Utc>) -> String {
    hhmm(Utc::now().signed_duration_since(since).num_minutes())
}

fn hhmm(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_convert_to_seconds() {
        assert_eq!(convert_to_seconds("25:30"), 1530);
        assert_eq!(convert_to_seconds("00:45"), 45);
        assert_eq!(convert_to_seconds("99:59"), 5999);
    }

    #[test]
    fn test_convert_rejects_invalid() {
        // Seconds component out of range
        assert_eq!(convert_to_seconds("99:99"), 0);
        assert_eq!(convert_to_seconds("10:60"), 0);
        // Not mm:ss at all
        assert_eq!(convert_to_seconds("90"), 0);
        assert_eq!(convert_to_seconds("a:b"), 0);
        assert_eq!(convert_to_seconds("-1:30"), 0);
        assert_eq!(convert_to_seconds(""), 0);
    }

    #[test]
    fn test_parse_time_spent_strict() {
        assert_eq!(parse_time_spent("25:30"), Some(1530));
        assert_eq!(parse_time_spent("0:00"), Some(0));
        assert_eq!(parse_time_spent("99:99"), None);
        assert_eq!(parse_time_spent("junk"), None);
    }

    #[test]
    fn test_format_time_round_trip() {
        assert_eq!(format_time(1530), "25:30");
        assert_eq!(format_time(45), "00:45");
        assert_eq!(format_time(0), "00:00");
    }

    #[test]
    fn test_format_display_date() {
        let dt = DateTime::parse_from_rfc3339("2024-03-05T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_display_date(Some(dt)), "03-05-2024");
        assert_eq!(format_display_date(None), "N/A");
    }

    #[test]
    fn test_hhmm_formatting() {
        assert_eq!(hhmm(0), "00:00");
        assert_eq!(hhmm(95), "01:35");
        assert_eq!(hhmm(600), "10:00");
        // Clock skew can make the elapsed span negative; clamp to zero
        assert_eq!(hhmm(-5), "00:00");
    }

    #[test]
    fn test_elapsed_hhmm() {
        // The clock advances between the subtraction and the read inside
        // elapsed_hhmm, so accept either side of a minute boundary.
        let since = Utc::now() - Duration::minutes(95);
        let shown = elapsed_hhmm(since);
        assert!(
            shown == "01:35" || shown == "01:36",
            "unexpected elapsed display: {}",
            shown
        );
    }
}
