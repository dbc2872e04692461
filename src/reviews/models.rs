//! Data models for extracted reviews.

use crate::reviews::extractor::ExtractError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single review recovered from a listing page. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    /// Raw date text, not normalized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helpful_votes: Option<u64>,
}

impl ReviewRecord {
    /// Returns true if the record carries a rating, a title, or body text.
    pub fn has_core_fields(&self) -> bool {
        self.rating.is_some() || self.review_text.is_some() || self.title.is_some()
    }
}

/// Review rating: either a count of star glyphs or a parsed numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Stars(u32),
    Score(f64),
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Stars(n) => write!(f, "{}", n),
            // Scores keep their decimal point, as in the JSON export
            Rating::Score(s) => write!(f, "{:?}", s),
        }
    }
}

/// What happened to one container during extraction.
#[derive(Debug)]
pub enum ContainerOutcome {
    /// Record with at least one core field
    Extracted(ReviewRecord),
    /// Only peripheral fields (or none) were found
    Discarded,
    /// A field could not be extracted
    Skipped(ExtractError),
}

/// A container that failed extraction, kept for diagnostics.
#[derive(Debug)]
pub struct SkippedContainer {
    /// Position in container discovery order
    pub index: usize,
    pub error: ExtractError,
}

/// Result of extracting one page.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Retained records in document order
    pub records: Vec<ReviewRecord>,
    /// Containers that failed extraction
    pub skipped: Vec<SkippedContainer>,
    /// Number of containers discovered
    pub containers: usize,
}

impl Extraction {
    /// Returns the number of retained records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records were retained.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
