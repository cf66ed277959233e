//! High-level processing: ID files in, parsed food items out.

use crate::error::Result;
use crate::fetch::{HttpClient, ItemFetcher};
use crate::file_utils::read_item_ids;
use crate::models::{ItemId, ParsedItem};
use crate::parsers::parse_item;
use std::path::Path;

/// Fetch every ID, then parse the bodies into food items.
///
/// Bodies that are not valid item JSON are dropped with a warning; items
/// without a restoration effect are dropped silently.
pub fn fetch_and_parse_items<C, I>(fetcher: &ItemFetcher<C>, item_ids: I) -> Result<Vec<ParsedItem>>
where
    C: HttpClient,
    I: IntoIterator<Item = ItemId>,
{
    let bodies = fetcher.fetch_items(item_ids)?;

    let items = bodies
        .into_iter()
        .filter_map(|(item_id, body)| match parse_item(&body) {
            Ok(Some(item)) => Some(item),
            Ok(None) => {
                tracing::debug!("Item {} has no restoration effect, skipping", item_id);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to parse item {}: {}", item_id, e);
                None
            }
        })
        .collect();

    Ok(items)
}

/// Process each ID file in order, pooling the results.
///
/// IDs repeated across files are fetched and kept once per file.
pub fn load_items<C, P>(fetcher: &ItemFetcher<C>, files: &[P]) -> Result<Vec<ParsedItem>>
where
    C: HttpClient,
    P: AsRef<Path>,
{
    let mut items = Vec::new();
    for file in files {
        let path = file.as_ref();
        let item_ids = read_item_ids(path)?;
        tracing::debug!("Read {} item IDs from {}", item_ids.len(), path.display());
        items.extend(fetch_and_parse_items(fetcher, item_ids)?);
    }
    Ok(items)
}

/// Items whose amounts are percentages, listed for manual review.
#[derive(Debug, Clone, Default)]
pub struct PercentReport {
    pub item_ids: Vec<ItemId>,
}

impl PercentReport {
    pub fn new(items: &[ParsedItem]) -> Self {
        Self {
            item_ids: items.iter().map(|item| item.id).collect(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        std::iter::once("Items using percentage values:".to_string())
            .chain(self.item_ids.iter().map(ItemId::to_string))
            .collect()
    }

    pub fn log(&self) {
        for line in self.lines() {
            tracing::info!("{}", line);
        }
    }
}
