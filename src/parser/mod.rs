pub mod extract;
pub mod text;

use extract::PageFacts;

/// HTML page → visible text → price/status and contact email.
pub fn process_html(html: &str) -> PageFacts {
    extract::extract_all(&text::visible_text(html))
}
