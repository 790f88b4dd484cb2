use scraper::{Html, Node};

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Visible text of an HTML document: text nodes joined by single spaces,
/// with script/style/noscript content and the `<head>` dropped.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| match a.value() {
            Node::Element(el) => HIDDEN_ELEMENTS.contains(&el.name()),
            _ => false,
        });
        if hidden {
            continue;
        }
        let t = text.trim();
        if !t.is_empty() {
            parts.push(t);
        }
    }

    collapse_whitespace(&parts.join(" "))
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_styles_and_head() {
        let html = std::fs::read_to_string("tests/fixtures/product_price.html").unwrap();
        let text = visible_text(&html);
        assert!(text.contains("Taq DNA Polymerase with Standard Taq Buffer"));
        assert!(text.contains("$1,234.56"));
        assert!(!text.contains("$9.99"));
        assert!(!text.contains("$0.00"));
        assert!(!text.contains("$0.01"));
        assert!(!text.contains("| NEB"));
    }

    #[test]
    fn js_shell_has_no_visible_text() {
        let html = std::fs::read_to_string("tests/fixtures/product_js_shell.html").unwrap();
        assert_eq!(visible_text(&html), "");
    }

    #[test]
    fn entities_decoded_and_spaced() {
        let text = visible_text("<p>Home &gt; <b>Products</b></p><p>Next\n\n line</p>");
        assert_eq!(text, "Home > Products Next line");
    }
}
