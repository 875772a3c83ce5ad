pub mod admins;
pub mod campaigns;
pub mod catalog;
pub mod delivery;
pub mod gallery;
pub mod newsletter;
pub mod orders;
pub mod push;
pub mod settings;

pub use delivery::DeliveryQuote;
pub use orders::OrderService;

/// Absolute http(s) URL with a host.
pub(crate) fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_urls_only() {
        assert!(is_http_url("https://images.grandsonproject.com/a.jpg"));
        assert!(is_http_url("http://localhost:3000/x"));
        assert!(!is_http_url("ftp://example.com/a.jpg"));
        assert!(!is_http_url("/relative/path.jpg"));
    }

    #[test]
    fn blank_values_become_none() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" Kaloum ")), Some("Kaloum".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
