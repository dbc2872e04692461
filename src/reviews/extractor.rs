//! Heuristic review extraction from listing page HTML.

use crate::config::Config;
use crate::reviews::matchers::{
    class_contains, direct_text, ClassText, HelpfulCount, LongText, MatcherChain, MonthText,
    StarClassRating, StarGlyphRating,
};
use crate::reviews::models::{ContainerOutcome, Extraction, Rating, ReviewRecord, SkippedContainer};
use crate::reviews::selectors::{self, DIV, PARAGRAPH, SPAN};
use scraper::{ElementRef, Html};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Failure while pulling a field out of one container.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{field}: cannot represent number {text:?}")]
    InvalidNumber { field: &'static str, text: String },
}

impl ExtractError {
    pub fn invalid_number(field: &'static str, text: &str) -> Self {
        Self::InvalidNumber { field, text: text.to_string() }
    }
}

/// Extracts review records from listing pages whose markup varies.
pub struct Extractor {
    marker: Option<String>,
    rating: MatcherChain<Rating>,
    title: MatcherChain<String>,
    review_text: MatcherChain<String>,
    reviewer_name: MatcherChain<String>,
    date: MatcherChain<String>,
    helpful_votes: MatcherChain<u64>,
}

impl Extractor {
    /// Creates an extractor that only uses the generic "review" class signal.
    pub fn new() -> Self {
        Self::with_marker(None)
    }

    /// Creates an extractor with an additional site-specific container class token.
    pub fn with_marker(marker: Option<String>) -> Self {
        let marker = marker.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());

        let extractor = Self {
            marker,
            rating: MatcherChain::new().with(StarClassRating).with(StarGlyphRating),
            title: MatcherChain::new().with(ClassText::new(
                &PARAGRAPH,
                "p",
                &selectors::TITLE_CLASSES,
            )),
            review_text: MatcherChain::new()
                .with(LongText::new(selectors::MIN_REVIEW_TEXT_CHARS)),
            reviewer_name: MatcherChain::new()
                .with(ClassText::new(&PARAGRAPH, "p", &[selectors::NAME_CLASS]).ignore_case())
                .with(ClassText::new(&SPAN, "span", &[selectors::NAME_CLASS]).ignore_case()),
            date: MatcherChain::new().with(MonthText),
            helpful_votes: MatcherChain::new().with(HelpfulCount),
        };

        if let Some(marker) = &extractor.marker {
            debug!("Container marker: {}", marker);
        }
        debug!("Rating matchers: {}", extractor.rating.descriptions().join(", "));
        debug!("Reviewer name matchers: {}", extractor.reviewer_name.descriptions().join(", "));

        extractor
    }

    /// Creates an extractor from application configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::with_marker(config.container_marker.clone())
    }

    /// Extracts all reviews from a page. Never fails; broken containers are
    /// reported in [`Extraction::skipped`].
    pub fn extract(&self, html: &str) -> Extraction {
        let document = Html::parse_document(html);
        let containers = self.find_containers(&document);

        let mut extraction = Extraction { containers: containers.len(), ..Default::default() };

        for (index, container) in containers.into_iter().enumerate() {
            match self.extract_container(container) {
                ContainerOutcome::Extracted(record) => {
                    trace!("Extracted review {}: {:?}", index, record.title);
                    extraction.records.push(record);
                }
                ContainerOutcome::Discarded => {
                    trace!("Discarding container {} without rating, title, or text", index);
                }
                ContainerOutcome::Skipped(error) => {
                    warn!("Failed to parse review container {}: {}", index, error);
                    extraction.skipped.push(SkippedContainer { index, error });
                }
            }
        }

        debug!(
            "Extracted {} reviews from {} containers ({} skipped)",
            extraction.records.len(),
            extraction.containers,
            extraction.skipped.len()
        );

        extraction
    }

    /// Locates review containers: structural class match first, then
    /// content signals if nothing matched.
    pub fn find_containers<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let structural = self.structural_containers(document);
        if !structural.is_empty() {
            debug!("Found {} containers by class", structural.len());
            return structural;
        }

        let signal = signal_containers(document);
        debug!("Found {} containers by star signal", signal.len());
        signal
    }

    fn structural_containers<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document
            .select(&DIV)
            .filter(|div| {
                class_contains(*div, selectors::REVIEW_CLASS, true)
                    || self.marker.as_deref().is_some_and(|m| class_contains(*div, m, true))
            })
            .collect()
    }

    /// Extracts one container, applying the retention rule.
    pub fn extract_container(&self, container: ElementRef<'_>) -> ContainerOutcome {
        match self.extract_fields(container) {
            Ok(record) if record.has_core_fields() => ContainerOutcome::Extracted(record),
            Ok(_) => ContainerOutcome::Discarded,
            Err(e) => ContainerOutcome::Skipped(e),
        }
    }

    fn extract_fields(&self, container: ElementRef<'_>) -> Result<ReviewRecord, ExtractError> {
        // Every field is attempted before the first failure is reported
        let rating = self.rating.extract(container);
        let title = self.title.extract(container);
        let review_text = self.review_text.extract(container);
        let reviewer_name = self.reviewer_name.extract(container);
        let date = self.date.extract(container);
        let helpful_votes = self.helpful_votes.extract(container);

        Ok(ReviewRecord {
            rating: rating?,
            title: title?,
            review_text: review_text?,
            reviewer_name: reviewer_name?,
            date: date?,
            helpful_votes: helpful_votes?,
        })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parents of `div`s whose own text carries a star glyph or the word "star",
/// one entry per signal `div`.
fn signal_containers(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .select(&DIV)
        .filter(|div| {
            let text = direct_text(*div);
            text.contains(selectors::STAR_GLYPH) || text.to_lowercase().contains(selectors::STAR_WORD)
        })
        .filter_map(|div| {
            div.ancestors().filter_map(ElementRef::wrap).find(|a| a.value().name() == "div")
        })
        .collect()
}
