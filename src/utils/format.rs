/// Format an ISO/RFC 3339 timestamp as a long date, e.g. "July 27, 2025".
/// Unparseable input falls back to the first 10 characters (YYYY-MM-DD)
/// or the original string.
pub fn format_date(timestamp: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(timestamp) {
        dt.format("%B %-d, %Y").to_string()
    } else if timestamp.len() >= 10 {
        timestamp.chars().take(10).collect()
    } else {
        timestamp.to_string()
    }
}

/// Format the time component as "09:28 pm" (2-digit hour, lowercase
/// am/pm). Unparseable input is returned as-is.
pub fn format_time(timestamp: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt.format("%I:%M %P").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Format date and time on two lines, e.g. "July 27, 2025\n09:28 pm".
pub fn format_date_time(timestamp: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt.format("%B %-d, %Y\n%I:%M %P").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Format a byte count for display, e.g. "1.5 MB".
pub fn format_size(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let bytes = bytes.max(0) as f64;
    if bytes >= GB {
        format!("{:.1} GB", bytes / GB)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{} B", bytes as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-07-27T21:28:00Z"), "July 27, 2025");
        assert_eq!(format_date("2025-07-27"), "2025-07-27"); // Not RFC 3339, passthrough
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time("2025-07-27T21:28:00Z"), "09:28 pm");
        assert_eq!(format_time("2025-07-27T09:05:00Z"), "09:05 am");
        assert_eq!(format_time("garbage"), "garbage");
    }

    #[test]
    fn test_format_date_time() {
        assert_eq!(
            format_date_time("2025-07-27T21:28:00Z"),
            "July 27, 2025\n09:28 pm"
        );
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(1_572_864), "1.5 MB");
        assert_eq!(format_size(-5), "0 B");
    }
}
