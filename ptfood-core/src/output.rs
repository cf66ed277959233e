//! PeriodicTable `PT:AddData` output generation.

use crate::categories::{CategorizedItems, item_value};
use crate::error::Result;
use crate::models::ParsedItem;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Render the `PT:AddData` statement for one category.
pub fn render_category(category: &str, items: &[ParsedItem]) -> Result<String> {
    let entries = items
        .iter()
        .map(|item| Ok(format!("{}:{}", item.id, item_value(item, category)?)))
        .collect::<Result<Vec<_>>>()?;

    Ok(format!("PT:AddData(\"{}\",\"{}\")", category, entries.join(",")))
}

/// Write one line per category, in first-populated order.
///
/// The writer is flushed even when rendering or writing fails.
pub fn write_addon_data<W: Write>(categorized: &CategorizedItems, writer: &mut W) -> Result<()> {
    let written = categorized.iter().try_for_each(|(category, items)| -> Result<()> {
        writeln!(writer, "{}", render_category(category, items)?)?;
        Ok(())
    });
    let flushed = writer.flush();

    written?;
    flushed?;
    Ok(())
}

/// Where the addon data goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        path.map_or(OutputTarget::Stdout, OutputTarget::File)
    }

    /// Write the categorized items to this target.
    pub fn write(&self, categorized: &CategorizedItems) -> Result<()> {
        match self {
            OutputTarget::Stdout => {
                tracing::info!("Writing to stdout");
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                write_addon_data(categorized, &mut handle)
            }
            OutputTarget::File(path) => {
                tracing::info!("Writing to {}", path.display());
                let mut writer = BufWriter::new(File::create(path)?);
                write_addon_data(categorized, &mut writer)
            }
        }
    }
}
