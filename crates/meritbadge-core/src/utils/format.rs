/// Normalize a CSV column heading for lookups.
/// Strips a byte-order mark, trims, lowercases and replaces spaces with underscores.
pub fn normalize_header(header: &str) -> String {
    header
        .trim_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Extract just the digits from a string
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format a phone number for display
/// Handles various input formats and normalizes to (XXX) XXX-XXXX
pub fn format_phone(phone: &str) -> String {
    let digits = digits_only(phone);

    match digits.len() {
        10 => format!(
            "({}) {}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..10]
        ),
        11 if digits.starts_with('1') => format!(
            "({}) {}-{}",
            &digits[1..4],
            &digits[4..7],
            &digits[7..11]
        ),
        _ => phone.to_string(), // Return original if can't format
    }
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

/// Empty strings become `None`, everything else is trimmed.
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Case-insensitive ordering without allocating lowercase copies.
pub fn cmp_ignore_case(a: &str, b: &str) -> std::cmp::Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("First Name"), "first_name");
        assert_eq!(normalize_header("  BSA_Number "), "bsa_number");
        assert_eq!(normalize_header("\u{feff}Member ID"), "member_id");
        assert_eq!(normalize_header("Date  Completed"), "date_completed");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone("15551234567"), "(555) 123-4567");
        assert_eq!(format_phone("555-123-4567"), "(555) 123-4567");
        assert_eq!(format_phone("(555) 123-4567"), "(555) 123-4567");
        assert_eq!(format_phone("123"), "123"); // Too short, return as-is
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  Troop 12 "), Some("Troop 12".to_string()));
        assert_eq!(non_empty("   "), None);
    }

    #[test]
    fn test_cmp_ignore_case() {
        use std::cmp::Ordering;
        assert_eq!(cmp_ignore_case("smith", "Smith"), Ordering::Equal);
        assert_eq!(cmp_ignore_case("adams", "Brown"), Ordering::Less);
        assert_eq!(cmp_ignore_case("Zed", "alpha"), Ordering::Greater);
    }
}
