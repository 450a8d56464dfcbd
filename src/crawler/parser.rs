//! Profile page parser
//!
//! This module turns a fetched profile page into a structured record.
//! The parser only needs two queries from the markup layer: the text of an
//! element by `id`, and the text of the first element matching a selector.
//! Both live behind [`MarkupQuery`] so the extraction rules stay independent
//! of the HTML library.

use crate::config::ParserConfig;
use crate::crawler::fetcher::FetchOutcome;
use scraper::{Html, Selector};

/// Placeholder for a field the profile page does not provide
pub const UNKNOWN: &str = "Unknown";

/// Fields extracted from a profile page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProfile {
    /// Display name, or [`UNKNOWN`]
    pub display_name: String,

    /// Level, or [`UNKNOWN`]
    pub level: String,
}

/// Read-only queries over a parsed markup document
pub trait MarkupQuery {
    /// Text content of the element whose `id` attribute equals `id`
    fn text_by_id(&self, id: &str) -> Option<String>;

    /// Text content of the first element matching a CSS selector
    ///
    /// A selector that cannot be compiled matches nothing.
    fn text_by_selector(&self, selector: &str) -> Option<String>;
}

/// HTML document backed by `scraper`
pub struct HtmlDocument {
    document: Html,
}

impl HtmlDocument {
    /// Parses HTML text; malformed markup is recovered, never rejected
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }
}

impl MarkupQuery for HtmlDocument {
    fn text_by_id(&self, id: &str) -> Option<String> {
        let selector = Selector::parse("[id]").ok()?;

        self.document
            .select(&selector)
            .find(|element| element.value().id() == Some(id))
            .map(|element| element.text().collect::<String>())
    }

    fn text_by_selector(&self, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;

        self.document
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>())
    }
}

/// Extraction rules for profile pages
#[derive(Debug, Clone)]
pub struct ProfileParser {
    error_container_id: String,
    not_found_phrase: String,
    name_selector: String,
    level_selector: String,
    level_prefix: String,
}

impl ProfileParser {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            error_container_id: config.error_container_id.clone(),
            not_found_phrase: config.not_found_phrase.clone(),
            name_selector: config.name_selector.clone(),
            level_selector: config.level_selector.clone(),
            level_prefix: config.level_prefix.clone(),
        }
    }

    /// Parses a fetch outcome
    ///
    /// # Returns
    ///
    /// * `Some(ParsedProfile)` - The page is a profile; absent fields are [`UNKNOWN`]
    /// * `None` - The outcome carried no content, or the page reports the
    ///   profile does not exist
    ///
    /// # Example
    ///
    /// ```
    /// use profile_sweep::config::ParserConfig;
    /// use profile_sweep::crawler::{FetchOutcome, ProfileParser};
    ///
    /// let parser = ProfileParser::new(&ParserConfig::default());
    /// let html = r#"<span class="actual_persona_name">Foo</span>"#;
    /// let profile = parser.parse(&FetchOutcome::Content(html.to_string())).unwrap();
    /// assert_eq!(profile.display_name, "Foo");
    /// assert_eq!(profile.level, "Unknown");
    /// ```
    pub fn parse(&self, outcome: &FetchOutcome) -> Option<ParsedProfile> {
        match outcome {
            FetchOutcome::Content(body) => self.parse_html(body),
            _ => None,
        }
    }

    /// Parses raw HTML of a served page
    pub fn parse_html(&self, html: &str) -> Option<ParsedProfile> {
        let document = HtmlDocument::parse(html);
        self.parse_document(&document)
    }

    /// Applies the extraction rules to any markup query implementation
    pub fn parse_document<Q: MarkupQuery + ?Sized>(&self, document: &Q) -> Option<ParsedProfile> {
        if self.is_not_found_page(document) {
            return None;
        }

        let display_name = document
            .text_by_selector(&self.name_selector)
            .and_then(|text| non_empty(text.trim()))
            .unwrap_or_else(|| UNKNOWN.to_string());

        let level = document
            .text_by_selector(&self.level_selector)
            .and_then(|text| non_empty(self.strip_level_prefix(&text).trim()))
            .unwrap_or_else(|| UNKNOWN.to_string());

        Some(ParsedProfile {
            display_name,
            level,
        })
    }

    fn is_not_found_page<Q: MarkupQuery + ?Sized>(&self, document: &Q) -> bool {
        document
            .text_by_id(&self.error_container_id)
            .map(|text| text.contains(&self.not_found_phrase))
            .unwrap_or(false)
    }

    fn strip_level_prefix(&self, text: &str) -> String {
        if self.level_prefix.is_empty() {
            text.to_string()
        } else {
            text.replace(&self.level_prefix, "")
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
