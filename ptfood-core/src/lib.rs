//! Core library for turning item API data into PeriodicTable food categories.

pub mod cache;
pub mod categories;
pub mod config;
pub mod error;
pub mod fetch;
pub mod file_utils;
pub mod models;
pub mod output;
pub mod parsers;
pub mod processors;

pub use error::{PtFoodError, Result};
pub use categories::{categorize_items, CategorizedItems};
pub use processors::{fetch_and_parse_items, load_items, PercentReport};
