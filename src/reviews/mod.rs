//! Review fetching, extraction, and data models.

pub mod client;
pub mod extractor;
pub mod matchers;
pub mod models;
pub mod selectors;

pub use client::{FetchError, PageFetcher, ReviewClient};
pub use extractor::{ExtractError, Extractor};
pub use models::{ContainerOutcome, Extraction, Rating, ReviewRecord, SkippedContainer};
