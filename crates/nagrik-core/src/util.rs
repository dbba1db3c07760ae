//! Small text and clock helpers shared by the store, config, and delivery.

/// Longest excerpt of a remote error body kept in a delivery error.
const ERROR_EXCERPT_CHARS: usize = 180;

/// Trim `value`; `None` when nothing but whitespace is left.
pub fn normalize_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// [`normalize_text`] over an optional field.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(normalize_text)
}

/// Reporting endpoint base URL without trailing slashes.
///
/// `None` unless the value is an `http://` or `https://` URL.
pub fn endpoint_base_url(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (trimmed.starts_with("http://") || trimmed.starts_with("https://"))
        .then(|| trimmed.trim_end_matches('/').to_string())
}

/// Single-line excerpt of a response body for error messages.
pub fn error_excerpt(body: &str) -> String {
    body.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(ERROR_EXCERPT_CHARS)
        .collect()
}

/// Current Unix timestamp in milliseconds.
pub fn unix_millis_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_text_is_absent() {
        assert_eq!(normalize_text(" \t\n"), None);
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(
            normalize_text_option(Some("  Ward 12  ".to_string())).as_deref(),
            Some("Ward 12")
        );
    }

    #[test]
    fn endpoint_base_url_requires_http_scheme() {
        assert_eq!(
            endpoint_base_url(" https://reports.example.in// ").as_deref(),
            Some("https://reports.example.in")
        );
        assert_eq!(
            endpoint_base_url("http://127.0.0.1:8080").as_deref(),
            Some("http://127.0.0.1:8080")
        );
        assert_eq!(endpoint_base_url("reports.example.in"), None);
        assert_eq!(endpoint_base_url("ftp://reports.example.in"), None);
    }

    #[test]
    fn error_excerpt_is_one_bounded_line() {
        assert_eq!(
            error_excerpt("  report\n  rejected:\tmissing category "),
            "report rejected: missing category"
        );
        assert_eq!(error_excerpt(&"x".repeat(400)).len(), ERROR_EXCERPT_CHARS);
    }
}
