//! Field matchers: small strategies that each try to recover one review field.
//!
//! Matchers for a field are grouped into a [`MatcherChain`] and tried in
//! priority order. A matcher that locates its source node settles the field,
//! even when that node yields no value; only an absent source passes the
//! field on to the next matcher.

use crate::reviews::extractor::ExtractError;
use crate::reviews::models::Rating;
use crate::reviews::selectors::{self, DIGITS, DIV, NUMBER};
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

/// What a matcher found in a container.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Source located and a value recovered
    Found(T),
    /// Source located but it carries no usable value; the field stays unset
    Empty,
    /// Source not present; the next matcher gets a turn
    Absent,
}

impl<T> Lookup<T> {
    fn from_option(value: Option<T>) -> Self {
        value.map_or(Lookup::Absent, Lookup::Found)
    }
}

/// Trait for recovering one field from a review container.
pub trait FieldMatcher<T>: Send + Sync {
    fn extract(&self, container: ElementRef<'_>) -> Result<Lookup<T>, ExtractError>;

    /// Returns a description of this matcher.
    fn description(&self) -> String;
}

/// An ordered list of matchers for one field.
pub struct MatcherChain<T> {
    matchers: Vec<Box<dyn FieldMatcher<T>>>,
}

impl<T> MatcherChain<T> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self { matchers: Vec::new() }
    }

    /// Appends a matcher with lower priority than those already added.
    pub fn with(mut self, matcher: impl FieldMatcher<T> + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Runs matchers in order until one locates its source.
    pub fn extract(&self, container: ElementRef<'_>) -> Result<Option<T>, ExtractError> {
        for matcher in &self.matchers {
            match matcher.extract(container)? {
                Lookup::Found(value) => return Ok(Some(value)),
                Lookup::Empty => return Ok(None),
                Lookup::Absent => {}
            }
        }
        Ok(None)
    }

    /// Returns descriptions of all matchers in priority order.
    pub fn descriptions(&self) -> Vec<String> {
        self.matchers.iter().map(|m| m.description()).collect()
    }
}

impl<T> Default for MatcherChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Node helpers

/// Returns true if the element's class attribute contains `token`.
pub fn class_contains(element: ElementRef<'_>, token: &str, ignore_case: bool) -> bool {
    let Some(class) = element.value().attr("class") else {
        return false;
    };

    if ignore_case {
        class.to_lowercase().contains(&token.to_lowercase())
    } else {
        class.contains(token)
    }
}

/// Concatenates the element's own text children, ignoring nested elements.
pub fn direct_text(element: ElementRef<'_>) -> String {
    element.children().filter_map(|child| child.value().as_text()).map(|text| &**text).collect()
}

/// Iterates every text node below the container in document order.
pub fn text_nodes<'a>(container: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    container.descendants().filter_map(|node| node.value().as_text()).map(|text| &**text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn count_stars(text: &str) -> u32 {
    text.chars().filter(|c| *c == selectors::STAR_GLYPH).count() as u32
}

// Rating

/// Rating from a `div` whose class mentions stars: glyph count, else the
/// first number in its text.
pub struct StarClassRating;

impl FieldMatcher<Rating> for StarClassRating {
    fn extract(&self, container: ElementRef<'_>) -> Result<Lookup<Rating>, ExtractError> {
        let Some(node) =
            container.select(&DIV).find(|e| class_contains(*e, selectors::STAR_CLASS, true))
        else {
            return Ok(Lookup::Absent);
        };

        let text = element_text(node);
        let stars = count_stars(&text);
        if stars > 0 {
            return Ok(Lookup::Found(Rating::Stars(stars)));
        }

        let Some(caps) = NUMBER.captures(&text) else {
            return Ok(Lookup::Empty);
        };

        caps[1]
            .parse::<f64>()
            .map(|score| Lookup::Found(Rating::Score(score)))
            .map_err(|_| ExtractError::invalid_number("rating", &caps[1]))
    }

    fn description(&self) -> String {
        "div with star class".to_string()
    }
}

/// Rating from the first text node carrying star glyphs.
pub struct StarGlyphRating;

impl FieldMatcher<Rating> for StarGlyphRating {
    fn extract(&self, container: ElementRef<'_>) -> Result<Lookup<Rating>, ExtractError> {
        Ok(Lookup::from_option(
            text_nodes(container)
                .find(|text| text.contains(selectors::STAR_GLYPH))
                .map(|text| Rating::Stars(count_stars(text))),
        ))
    }

    fn description(&self) -> String {
        format!("text containing {}", selectors::STAR_GLYPH)
    }
}

// Text fields

/// Trimmed text of the first element of one tag whose class contains any of
/// the given tokens. Blank text leaves the field unset.
pub struct ClassText {
    selector: &'static LazyLock<Selector>,
    tag: &'static str,
    tokens: Vec<&'static str>,
    ignore_case: bool,
}

impl ClassText {
    /// Creates a matcher for `tag` elements selected by `selector`.
    pub fn new(
        selector: &'static LazyLock<Selector>,
        tag: &'static str,
        tokens: &[&'static str],
    ) -> Self {
        Self { selector, tag, tokens: tokens.to_vec(), ignore_case: false }
    }

    /// Matches class tokens case-insensitively.
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

impl FieldMatcher<String> for ClassText {
    fn extract(&self, container: ElementRef<'_>) -> Result<Lookup<String>, ExtractError> {
        let selector: &Selector = self.selector;
        let Some(element) = container
            .select(selector)
            .find(|e| self.tokens.iter().any(|token| class_contains(*e, token, self.ignore_case)))
        else {
            return Ok(Lookup::Absent);
        };

        let text = element_text(element);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Ok(Lookup::Empty)
        } else {
            Ok(Lookup::Found(trimmed.to_string()))
        }
    }

    fn description(&self) -> String {
        format!("<{}> with class containing {}", self.tag, self.tokens.join(" or "))
    }
}

/// First `div` whose own text is longer than the minimum length.
pub struct LongText {
    min_chars: usize,
}

impl LongText {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }
}

impl FieldMatcher<String> for LongText {
    fn extract(&self, container: ElementRef<'_>) -> Result<Lookup<String>, ExtractError> {
        Ok(Lookup::from_option(
            container
                .select(&DIV)
                .map(direct_text)
                .map(|text| text.trim().to_string())
                .find(|text| text.chars().count() > self.min_chars),
        ))
    }

    fn description(&self) -> String {
        format!("div text longer than {} chars", self.min_chars)
    }
}

/// First text node mentioning a month abbreviation, kept verbatim.
pub struct MonthText;

impl FieldMatcher<String> for MonthText {
    fn extract(&self, container: ElementRef<'_>) -> Result<Lookup<String>, ExtractError> {
        Ok(Lookup::from_option(
            text_nodes(container)
                .find(|text| selectors::MONTHS.iter().any(|month| text.contains(month)))
                .map(|text| text.trim().to_string()),
        ))
    }

    fn description(&self) -> String {
        "text containing a month abbreviation".to_string()
    }
}

// Helpful votes

/// Digit run from the first text node that mentions "helpful".
pub struct HelpfulCount;

impl FieldMatcher<u64> for HelpfulCount {
    fn extract(&self, container: ElementRef<'_>) -> Result<Lookup<u64>, ExtractError> {
        let Some(text) =
            text_nodes(container).find(|text| text.to_lowercase().contains(selectors::HELPFUL_WORD))
        else {
            return Ok(Lookup::Absent);
        };

        let Some(caps) = DIGITS.captures(text) else {
            return Ok(Lookup::Empty);
        };

        caps[1]
            .parse::<u64>()
            .map(Lookup::Found)
            .map_err(|_| ExtractError::invalid_number("helpful_votes", &caps[1]))
    }

    fn description(&self) -> String {
        "digits in text containing 'helpful'".to_string()
    }
}
