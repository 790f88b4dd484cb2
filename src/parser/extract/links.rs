use std::collections::HashSet;

use scraper::{Html, Selector};

/// Result links from a search-engine results page, in page order.
///
/// `/url?q=<target>&...` redirect hrefs are decoded to their target. Links
/// pointing back at the search engine (`engine_host`) are dropped.
pub fn extract(html: &str, engine_host: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let a_tag = Selector::parse("a[href]").unwrap();
    let engine = engine_label(engine_host);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for tag in document.select(&a_tag) {
        let Some(href) = tag.value().attr("href") else {
            continue;
        };
        let Some(target) = resolve_href(href) else {
            continue;
        };
        if !engine.is_empty() && extract_domain(&target).contains(&engine) {
            continue;
        }
        if seen.insert(target.clone()) {
            links.push(target);
        }
    }

    links
}

fn resolve_href(href: &str) -> Option<String> {
    if let Some(query) = href.strip_prefix("/url?") {
        return url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned())
            .filter(|v| v.starts_with("http"));
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    None
}

/// Host of a URL without scheme, path or leading `www.`.
pub fn extract_domain(url: &str) -> String {
    url.split("//")
        .nth(1)
        .unwrap_or(url)
        .split('/')
        .next()
        .unwrap_or("")
        .split(['?', '#'])
        .next()
        .unwrap_or("")
        .trim_start_matches("www.")
        .to_lowercase()
}

/// "www.google.com" -> "google"
fn engine_label(host: &str) -> String {
    let host = host.trim_start_matches("www.");
    let parts: Vec<&str> = host.split('.').collect();
    match parts.len() {
        0 | 1 => host.to_lowercase(),
        n => parts[n - 2].to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_results_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/google_results.html").unwrap();
        let links = extract(&html, "www.google.com");
        assert_eq!(
            links.first().map(String::as_str),
            Some("https://www.neb.com/en-us/products/m0273-taq-dna-polymerase-with-standard-taq-buffer")
        );
        assert!(links.iter().all(|l| !l.contains("google")));
    }

    #[test]
    fn redirect_links_are_decoded() {
        let html = r#"<a href="/url?q=https://www.abcam.com/en-us/products/ab1%3Fx%3D1&amp;sa=U">x</a>"#;
        assert_eq!(extract(html, "www.google.com"), vec!["https://www.abcam.com/en-us/products/ab1?x=1"]);
    }

    #[test]
    fn relative_and_engine_links_skipped() {
        let html = r#"
            <a href="/search?q=next">Next</a>
            <a href="https://maps.google.com/x">Maps</a>
            <a href="https://www.qiagen.com/us/products/rneasy">RNeasy</a>
            <a href="https://www.qiagen.com/us/products/rneasy">dup</a>
        "#;
        assert_eq!(
            extract(html, "www.google.com"),
            vec!["https://www.qiagen.com/us/products/rneasy"]
        );
    }

    #[test]
    fn domain_strips_www_and_path() {
        assert_eq!(extract_domain("https://www.sigmaaldrich.com/US/en/search/x"), "sigmaaldrich.com");
        assert_eq!(extract_domain("https://us.vwr.com?x=1"), "us.vwr.com");
    }
}
