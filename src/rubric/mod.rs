mod criteria;
mod evaluate;
mod metrics;
mod patterns;
#[cfg(test)]
mod tests;

pub use self::evaluate::{evaluate_page, unreadable_page};
pub use self::metrics::PageMetrics;
pub use self::patterns::MarkdownPatterns;
