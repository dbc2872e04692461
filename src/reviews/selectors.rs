//! Selectors, markers, and patterns used by the review extractor.
//!
//! Review markup is not stable across product pages, so matching is done on
//! loose signals (tag name plus a class substring, or text content) rather
//! than exact class names. Update the markers here when a site changes.

use regex_lite::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// Division-like nodes: review containers, rating blocks, body text.
pub static DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());

/// Paragraph-like nodes: titles and reviewer names.
pub static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

/// Inline span-like nodes: reviewer name fallback.
pub static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());

/// Class substring that marks a review container.
pub const REVIEW_CLASS: &str = "review";

/// Class substring that marks a rating block.
pub const STAR_CLASS: &str = "star";

/// Class substrings that mark a review title.
pub const TITLE_CLASSES: [&str; 2] = ["title", "heading"];

/// Class substring that marks a reviewer name.
pub const NAME_CLASS: &str = "name";

/// Glyph repeated once per star in a rating.
pub const STAR_GLYPH: char = '★';

/// Word that signals rating content in fallback container discovery.
pub const STAR_WORD: &str = "star";

/// Word that signals a helpfulness counter.
pub const HELPFUL_WORD: &str = "helpful";

/// Body text must be strictly longer than this many characters.
pub const MIN_REVIEW_TEXT_CHARS: usize = 20;

/// Month abbreviations that identify date text.
pub const MONTHS: [&str; 12] =
    ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// First integer or decimal number in a rating text.
pub static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").unwrap());

/// First run of digits in a helpfulness text.
pub static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_selectors_compile() {
        let _ = &*DIV;
        let _ = &*PARAGRAPH;
        let _ = &*SPAN;
        let _ = &*NUMBER;
        let _ = &*DIGITS;
    }

    #[test]
    fn test_number_pattern() {
        let caps = NUMBER.captures("Rated 4.5 out of 5").unwrap();
        assert_eq!(&caps[1], "4.5");

        let caps = NUMBER.captures("3 stars").unwrap();
        assert_eq!(&caps[1], "3");

        assert!(NUMBER.captures("no digits here").is_none());
    }

    #[test]
    fn test_digits_pattern() {
        let caps = DIGITS.captures("1,204 people found this helpful").unwrap();
        assert_eq!(&caps[1], "1");
    }

    #[test]
    fn test_element_selectors() {
        let html = Html::parse_fragment("<div><p class='t'>a</p><span>b</span></div>");
        assert_eq!(html.select(&DIV).count(), 1);
        assert_eq!(html.select(&PARAGRAPH).count(), 1);
        assert_eq!(html.select(&SPAN).count(), 1);
    }
}
