//! HTML parser for extracting records and the next-page link
//!
//! Extraction is site-specific, so it sits behind the `SiteExtractor` trait.
//! `QuotesExtractor` drives it with CSS selectors; its defaults match markup
//! of the form:
//!
//! ```html
//! <div class="quote">
//!   <span class="text">“…”</span>
//!   <small class="author">…</small>
//!   <div class="tags"><a class="tag">…</a></div>
//! </div>
//! <li class="next"><a href="/page/2/">Next</a></li>
//! ```

use crate::config::SelectorConfig;
use crate::output::Record;
use crate::{ConfigError, ConfigResult};
use scraper::{ElementRef, Html, Selector};

/// Site-specific extraction capability
pub trait SiteExtractor: Send + Sync {
    /// Returns every record on the page, in document order
    fn extract_records(&self, document: &Html) -> Vec<Record>;

    /// Returns the raw href of the "next page" link, if the page has one
    fn find_next_link(&self, document: &Html) -> Option<String>;
}

/// Records and next link pulled from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub records: Vec<Record>,
    pub next_href: Option<String>,
}

/// Parses a page body and runs the extractor over it
///
/// # Example
///
/// ```
/// use quote_trawler::config::SelectorConfig;
/// use quote_trawler::crawler::{parse_page, QuotesExtractor};
///
/// let extractor = QuotesExtractor::from_config(&SelectorConfig::default()).unwrap();
/// let html = r#"<div class="quote"><span class="text">Hi</span></div>
///               <li class="next"><a href="/page/2/">Next</a></li>"#;
/// let page = parse_page(&extractor, html);
/// assert_eq!(page.records.len(), 1);
/// assert_eq!(page.next_href.as_deref(), Some("/page/2/"));
/// ```
pub fn parse_page(extractor: &dyn SiteExtractor, body: &str) -> ParsedPage {
    let document = Html::parse_document(body);

    ParsedPage {
        records: extractor.extract_records(&document),
        next_href: extractor.find_next_link(&document),
    }
}

/// Selector-driven extractor for quote listings
#[derive(Debug, Clone)]
pub struct QuotesExtractor {
    quote: Selector,
    text: Selector,
    author: Selector,
    tags: Selector,
    next: Selector,
}

impl QuotesExtractor {
    /// Compiles the configured selectors
    pub fn from_config(config: &SelectorConfig) -> ConfigResult<Self> {
        Ok(Self {
            quote: compile("quote", &config.quote)?,
            text: compile("text", &config.text)?,
            author: compile("author", &config.author)?,
            tags: compile("tags", &config.tags)?,
            next: compile("next", &config.next)?,
        })
    }

    fn extract_record(&self, index: usize, element: ElementRef<'_>) -> Record {
        let text = element.select(&self.text).next().map(element_text);
        if text.is_none() {
            tracing::debug!("Record {} has no text element", index);
        }

        let author = element.select(&self.author).next().map(element_text);
        if author.is_none() {
            tracing::debug!("Record {} has no author element", index);
        }

        let tags = element.select(&self.tags).map(element_text).collect();

        Record {
            text: text.unwrap_or_default(),
            author: author.unwrap_or_default(),
            tags,
        }
    }
}

impl SiteExtractor for QuotesExtractor {
    fn extract_records(&self, document: &Html) -> Vec<Record> {
        document
            .select(&self.quote)
            .enumerate()
            .map(|(index, element)| self.extract_record(index, element))
            .collect()
    }

    fn find_next_link(&self, document: &Html) -> Option<String> {
        document
            .select(&self.next)
            .next()
            .and_then(|element| element.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
    }
}

fn compile(field: &str, selector: &str) -> ConfigResult<Selector> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        field: field.to_string(),
        selector: selector.to_string(),
    })
}

/// Element text with every text node trimmed, joined without separators
fn element_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}
