//! Output formatting and file writers for reviews (table, JSON, CSV).

use crate::config::OutputFormat;
use crate::reviews::ReviewRecord;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Fixed column order of the CSV export.
pub const CSV_COLUMNS: [&str; 6] =
    ["rating", "title", "review_text", "reviewer_name", "date", "helpful_votes"];

/// Formats reviews for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats multiple reviews.
    pub fn format_reviews(&self, reviews: &[ReviewRecord]) -> String {
        if reviews.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => Self::csv_header(),
                OutputFormat::Table => "No reviews found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => Self::json_reviews(reviews),
            OutputFormat::Table => Self::table_reviews(reviews),
            OutputFormat::Csv => Self::csv_reviews(reviews),
        }
    }

    // JSON formatting

    fn json_reviews(reviews: &[ReviewRecord]) -> String {
        serde_json::to_string_pretty(reviews).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_reviews(reviews: &[ReviewRecord]) -> String {
        let mut blocks = Vec::new();

        for (i, review) in reviews.iter().enumerate() {
            let mut lines = vec![format!("Review {}:", i + 1)];

            if let Some(rating) = &review.rating {
                lines.push(format!("  rating:        {}", rating));
            }
            if let Some(title) = &review.title {
                lines.push(format!("  title:         {}", title));
            }
            if let Some(text) = &review.review_text {
                lines.push(format!("  review_text:   {}", Self::truncate(text, 80)));
            }
            if let Some(name) = &review.reviewer_name {
                lines.push(format!("  reviewer_name: {}", name));
            }
            if let Some(date) = &review.date {
                lines.push(format!("  date:          {}", date));
            }
            if let Some(votes) = review.helpful_votes {
                lines.push(format!("  helpful_votes: {}", votes));
            }

            blocks.push(lines.join("\n"));
        }

        blocks.join("\n\n")
    }

    fn truncate(text: &str, max_chars: usize) -> String {
        if text.chars().count() > max_chars {
            let head: String = text.chars().take(max_chars - 3).collect();
            format!("{}...", head)
        } else {
            text.to_string()
        }
    }

    // CSV formatting

    fn csv_header() -> String {
        CSV_COLUMNS.join(",")
    }

    fn csv_reviews(reviews: &[ReviewRecord]) -> String {
        let mut lines = Vec::with_capacity(reviews.len() + 1);
        lines.push(Self::csv_header());

        for review in reviews {
            let rating = review.rating.map(|r| r.to_string()).unwrap_or_default();
            let votes = review.helpful_votes.map(|v| v.to_string()).unwrap_or_default();

            let cells = [
                rating,
                Self::csv_cell(review.title.as_deref()),
                Self::csv_cell(review.review_text.as_deref()),
                Self::csv_cell(review.reviewer_name.as_deref()),
                Self::csv_cell(review.date.as_deref()),
                votes,
            ];
            lines.push(cells.join(","));
        }

        lines.join("\n")
    }

    fn csv_cell(value: Option<&str>) -> String {
        value.map(Self::csv_escape).unwrap_or_default()
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// Writes reviews as CSV with a header row, even when empty.
pub fn write_csv(path: impl AsRef<Path>, reviews: &[ReviewRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut content = Formatter::csv_reviews(reviews);
    content.push('\n');

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;

    info!("Saved {} reviews to {}", reviews.len(), path.display());
    Ok(())
}

/// Writes reviews as a pretty-printed JSON array.
pub fn write_json(path: impl AsRef<Path>, reviews: &[ReviewRecord]) -> Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(reviews).context("Failed to serialize reviews")?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;

    info!("Saved {} reviews to {}", reviews.len(), path.display());
    Ok(())
}
