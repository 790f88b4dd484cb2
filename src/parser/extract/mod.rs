pub mod email;
pub mod links;
pub mod price;

pub use price::{classify, PriceStatus};

/// Everything pulled from one page's visible text.
#[derive(Debug, Clone)]
pub struct PageFacts {
    pub status: PriceStatus,
    pub email: Option<String>,
}

pub fn extract_all(text: &str) -> PageFacts {
    PageFacts {
        status: price::classify(text),
        email: email::extract(text),
    }
}
