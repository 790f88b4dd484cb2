use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").unwrap());

pub fn extract(text: &str) -> Option<String> {
    EMAIL_RE
        .find(text)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_address_wins() {
        let text = "Questions? orders@vendor.com or support@vendor.com.";
        assert_eq!(extract(text).as_deref(), Some("orders@vendor.com"));
    }

    #[test]
    fn no_address() {
        assert_eq!(extract("Call 1-800-555-0100"), None);
    }
}
