//! Trend extraction

use crate::sources::NewsItem;

pub(crate) const STAGE: &str = "trend_extraction";

/// Maximum number of headlines carried into prompting
pub const TREND_CAP: usize = 5;

/// Keep the first [`TREND_CAP`] items in their original order
pub fn extract_trends(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut items = items;
    items.truncate(TREND_CAP);
    items
}
