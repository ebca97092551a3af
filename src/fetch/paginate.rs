//! Pagination driver
//!
//! Walks a listing page by page and keeps the items whose timestamp falls in a
//! [`PageWindow`]. Listings are expected newest first: the first item older
//! than the window start ends the walk, since every later item (on this page
//! and the following ones) would be older still. Unordered pages would be
//! truncated at the first old item.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::FetchError;
use crate::window::{PageWindow, WindowPosition};

/// A paginated listing
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    /// Items on `page`; an empty vector means the listing is exhausted
    async fn fetch_page(&self, page: u32) -> Result<Vec<Self::Item>, FetchError>;

    /// Epoch seconds used for window filtering, `None` if the item has none
    fn timestamp(&self, item: &Self::Item) -> Option<i64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub start_page: u32,
    /// Stop once this many in-window items were collected
    pub max_items: Option<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            start_page: 1,
            max_items: None,
        }
    }
}

/// Collect every in-window item, one page request at a time
pub async fn collect_window<S>(
    source: &S,
    window: &PageWindow,
    config: PaginationConfig,
) -> Result<Vec<S::Item>, FetchError>
where
    S: PageSource + ?Sized,
{
    let mut items = Vec::new();
    let mut page = config.start_page;
    let mut done = false;

    while !done {
        let batch = source.fetch_page(page).await?;
        let fetched = batch.len();

        if batch.is_empty() {
            info!(page, "Empty page, listing exhausted");
            break;
        }

        for item in batch {
            let Some(timestamp) = source.timestamp(&item) else {
                warn!(page, "Item has no readable timestamp, skipping");
                continue;
            };

            match window.position(timestamp) {
                WindowPosition::Before => {
                    info!(page, timestamp, start = window.start(), "Item older than window, stopping");
                    done = true;
                    break;
                }
                WindowPosition::After => {
                    debug!(page, timestamp, end = window.end(), "Item newer than window, skipping");
                }
                WindowPosition::Within => {
                    items.push(item);

                    if config.max_items.is_some_and(|max| items.len() >= max) {
                        info!(page, collected = items.len(), "Item limit reached, stopping");
                        done = true;
                        break;
                    }
                }
            }
        }

        info!(page, fetched, collected = items.len(), "Processed page");
        page += 1;
    }

    Ok(items)
}
