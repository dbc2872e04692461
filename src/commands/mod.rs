//! CLI command implementations.

pub mod parse;
pub mod scrape;

pub use parse::ParseCommand;
pub use scrape::{page_url, ScrapeCommand, ScrapeReport};
