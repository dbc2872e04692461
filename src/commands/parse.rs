//! Parse command: extracts reviews from a saved listing page.

use crate::config::Config;
use crate::reviews::{Extraction, Extractor};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Extracts reviews from local HTML without touching the network.
pub struct ParseCommand {
    extractor: Extractor,
}

impl ParseCommand {
    /// Creates a new parse command.
    pub fn new(config: &Config) -> Self {
        Self { extractor: Extractor::from_config(config) }
    }

    /// Reads and extracts an HTML file.
    pub fn execute(&self, path: impl AsRef<Path>) -> Result<Extraction> {
        let path = path.as_ref();
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read HTML file: {}", path.display()))?;

        let extraction = self.extractor.extract(&html);
        info!("Found {} reviews in {}", extraction.count(), path.display());
        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"<html><body><div class="col _2wzgFH">
                <div class="_3LWZlK">4</div>
                <p class="_2-N8zT title">Nice product</p>
            </div></body></html>"#
        )
        .unwrap();

        let config = Config { container_marker: Some("_2wzgFH".to_string()), ..Config::default() };
        let extraction = ParseCommand::new(&config).execute(file.path()).unwrap();
        assert_eq!(extraction.count(), 1);
        assert_eq!(extraction.records[0].title.as_deref(), Some("Nice product"));
        assert_eq!(extraction.records[0].rating, None);
    }

    #[test]
    fn test_parse_missing_file() {
        let err = ParseCommand::new(&Config::default()).execute("/nonexistent/page.html").unwrap_err();
        assert!(err.to_string().contains("Failed to read HTML file"));
    }
}
