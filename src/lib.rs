//! review-scraper - Heuristic product-review scraper
//!
//! Fetches paginated review listings, recovers review fields from loosely
//! structured markup, and exports the result as CSV and JSON.

pub mod commands;
pub mod config;
pub mod format;
pub mod reviews;

pub use config::Config;
pub use reviews::{Extraction, Extractor, Rating, ReviewRecord};
