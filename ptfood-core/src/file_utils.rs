//! File utility functions.

use crate::error::{PtFoodError, Result};
use crate::models::ItemId;
use std::collections::BTreeSet;
use std::path::Path;

/// Read file with UTF-8 encoding.
pub fn read_utf8_file(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

/// Parse comma-separated item IDs, possibly spread over several lines.
///
/// Duplicates collapse; the set iterates in ascending ID order.
pub fn parse_item_ids(text: &str) -> Result<BTreeSet<ItemId>> {
    let mut ids = BTreeSet::new();
    for (line_no, line) in text.lines().enumerate() {
        for token in line.split(',') {
            let token = token.trim();
            let id = token.parse::<ItemId>().map_err(|e| {
                PtFoodError::Parse(format!(
                    "Invalid item ID {:?} on line {}: {}",
                    token,
                    line_no + 1,
                    e
                ))
            })?;
            ids.insert(id);
        }
    }
    Ok(ids)
}

/// Read the set of item IDs listed in a file.
pub fn read_item_ids(path: &Path) -> Result<BTreeSet<ItemId>> {
    let text = read_utf8_file(path)?;
    parse_item_ids(&text).map_err(|e| match e {
        PtFoodError::Parse(msg) => PtFoodError::Parse(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}
