use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

// The amount must not be followed by another digit, so "1,234.567" or
// "1.234,56" never yield a shortened prefix. A trailing "." or "," is allowed
// when it ends a sentence.
static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:\$|USD|€)\s?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{1,2})?)(?:[.,](?:[^\d]|$)|[^\d.,]|$)").unwrap()
});
static LABELED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b((?:list price|your price|price)\s*:\s*(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{1,2})?)(?:[.,](?:[^\d]|$)|[^\d.,]|$)",
    )
    .unwrap()
});
static HIDDEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:request (?:a |for )?quot(?:e|ation)|call for pric(?:es?|ing)|log ?in for pric(?:es?|ing)|sign in (?:for|to see) pric(?:es?|ing)|quote required|contact us for pric(?:es?|ing))\b",
    )
    .unwrap()
});

pub const NOT_FOUND: &str = "Not found (may require login or JS)";

/// Outcome of looking for a price on one supplier page.
///
/// `Error` is never produced by [`classify`]; the lookup pipeline uses it for
/// fetch failures so they stay distinguishable from a hidden or missing price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PriceStatus {
    Price(String),
    Hidden(String),
    NotFound,
    Error(String),
}

impl PriceStatus {
    /// Ordering used when two fetch paths disagree: a price beats a hidden
    /// marker, which beats nothing, which beats an error.
    pub fn rank(&self) -> u8 {
        match self {
            PriceStatus::Price(_) => 3,
            PriceStatus::Hidden(_) => 2,
            PriceStatus::NotFound => 1,
            PriceStatus::Error(_) => 0,
        }
    }

    pub fn is_price(&self) -> bool {
        matches!(self, PriceStatus::Price(_))
    }
}

impl fmt::Display for PriceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceStatus::Price(p) => write!(f, "{}", p),
            PriceStatus::Hidden(phrase) => write!(f, "Price hidden ({})", phrase),
            PriceStatus::NotFound => f.write_str(NOT_FOUND),
            PriceStatus::Error(e) => write!(f, "Error: {}", e),
        }
    }
}

/// Classify visible page text. First matching bucket wins:
/// currency-prefixed amount, labeled price, hidden-price phrase, nothing.
pub fn classify(text: &str) -> PriceStatus {
    if let Some(m) = CURRENCY_RE.captures(text).and_then(|c| c.get(1)) {
        return PriceStatus::Price(m.as_str().trim().to_string());
    }
    if let Some(m) = LABELED_RE.captures(text).and_then(|c| c.get(1)) {
        return PriceStatus::Price(m.as_str().trim().to_string());
    }
    if let Some(m) = HIDDEN_RE.find(text) {
        return PriceStatus::Hidden(m.as_str().to_string());
    }
    PriceStatus::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_token_with_separators() {
        let status = classify("Taq DNA Polymerase 500 units $1,234.56 Add to cart");
        assert_eq!(status, PriceStatus::Price("$1,234.56".into()));
    }

    #[test]
    fn usd_and_euro_prefixes() {
        assert_eq!(classify("Unit price USD 89.00"), PriceStatus::Price("USD 89.00".into()));
        assert_eq!(classify("Preis €45"), PriceStatus::Price("€45".into()));
    }

    #[test]
    fn longer_numbers_are_not_cut_short() {
        assert_eq!(classify("Cost $1,234.567 each"), PriceStatus::NotFound);
        assert_eq!(classify("Only 3 left. Price: 1.234,56"), PriceStatus::NotFound);
        assert_eq!(classify("€ 45,00"), PriceStatus::NotFound);
        // a later well-formed amount still counts
        assert_eq!(
            classify("Was $1,234.567, now $1,199.00"),
            PriceStatus::Price("$1,199.00".into())
        );
    }

    #[test]
    fn amount_at_sentence_end() {
        assert_eq!(classify("It costs $95.00."), PriceStatus::Price("$95.00".into()));
        assert_eq!(classify("Price: 40, shipped"), PriceStatus::Price("Price: 40".into()));
    }

    #[test]
    fn labeled_price_without_symbol() {
        assert_eq!(
            classify("Catalog M0273S  List Price: 312.00  In stock"),
            PriceStatus::Price("List Price: 312.00".into())
        );
    }

    #[test]
    fn currency_beats_hidden_phrase() {
        let status = classify("Request Quote for bulk orders. 1 mL: $95.00");
        assert_eq!(status, PriceStatus::Price("$95.00".into()));
    }

    #[test]
    fn request_quote_is_hidden_not_missing() {
        let status = classify("Custom antibody conjugation. Request Quote today.");
        assert_eq!(status, PriceStatus::Hidden("Request Quote".into()));
    }

    #[test]
    fn hidden_phrase_variants() {
        for text in [
            "Call for price",
            "Please login for price",
            "Quote required",
            "Contact us for pricing",
            "Call for prices",
            "Contact us for prices",
            "Login for prices",
            "Request for Quote",
            "Request a quotation",
        ] {
            assert!(
                matches!(classify(text), PriceStatus::Hidden(_)),
                "expected hidden for {:?}",
                text
            );
        }
    }

    #[test]
    fn nothing_matches() {
        let status = classify("Product overview. Storage at -20 C. 50 reactions.");
        assert_eq!(status, PriceStatus::NotFound);
        assert_eq!(status.to_string(), NOT_FOUND);
    }

    #[test]
    fn display_keeps_causes_apart() {
        let hidden = PriceStatus::Hidden("Call for price".into()).to_string();
        let error = PriceStatus::Error("request timed out".into()).to_string();
        assert_ne!(hidden, NOT_FOUND);
        assert_ne!(error, NOT_FOUND);
        assert!(error.starts_with("Error:"));
    }

    #[test]
    fn rank_order() {
        assert!(PriceStatus::Price("$1".into()).rank() > PriceStatus::Hidden("x".into()).rank());
        assert!(PriceStatus::Hidden("x".into()).rank() > PriceStatus::NotFound.rank());
        assert!(PriceStatus::NotFound.rank() > PriceStatus::Error("e".into()).rank());
    }
}
