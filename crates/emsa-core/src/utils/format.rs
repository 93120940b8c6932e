use chrono::{NaiveDate, NaiveDateTime};

/// Case-insensitive substring test
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None or empty
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Format an optional date as "Mar 15, 2024", or "-" when absent
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%b %d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Format an optional timestamp as "2024-03-20 10:30", or "-" when absent
pub fn format_timestamp(ts: Option<NaiveDateTime>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Héllo Wörld", 8), "Héllo...");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(&Some("x".to_string()), "-"), "x");
        assert_eq!(format_optional(&Some(String::new()), "-"), "-");
        assert_eq!(format_optional(&None, "n/a"), "n/a");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 3, 15)), "Mar 15, 2024");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Engineering", "ENG"));
        assert!(!contains_ignore_case("Finance", "eng"));
    }
}
