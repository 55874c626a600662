//! Field extraction from park site markup
//!
//! Page structure (class names, nesting) changes over time, so extraction goes
//! through the [`MarkupExtractor`] trait. Each layout version knows its own
//! selectors, and every lookup returns a `Result` so a single missing element
//! can be replaced by a placeholder instead of aborting the whole page.

use html_escape::decode_html_entities;
use lol_html::{element, rewrite_str, text, RewriteStrSettings};
use std::cell::{Cell, RefCell};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when extracting data from markup
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No element matched the selector for the named part of the page
    #[error("{0} not found in page")]
    Missing(&'static str),

    /// The HTML rewriter rejected the document
    #[error("Failed to process markup: {0}")]
    Rewrite(String),
}

/// A named piece of information on a site page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteField {
    Designation,
    Title,
    Locality,
    Region,
    PostalCode,
    Phone,
}

impl SiteField {
    pub fn label(self) -> &'static str {
        match self {
            SiteField::Designation => "designation",
            SiteField::Title => "title",
            SiteField::Locality => "locality",
            SiteField::Region => "region",
            SiteField::PostalCode => "postal code",
            SiteField::Phone => "phone",
        }
    }
}

/// An anchor's target and visible text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// Extracts links and fields from one version of the site's page layout
pub trait MarkupExtractor: fmt::Debug {
    /// Layout version this extractor understands
    fn version(&self) -> u32;

    /// State entries from the directory page's state menu
    fn state_links(&self, html: &str) -> Result<Vec<Link>, ExtractError>;

    /// Relative links to the site pages listed on a state page
    fn site_links(&self, html: &str) -> Result<Vec<String>, ExtractError>;

    /// Text of the first element holding `field` on a site page
    fn field(&self, html: &str, field: SiteField) -> Result<String, ExtractError>;
}

/// Page layout in use on the park service site
#[derive(Debug, Clone, Copy, Default)]
pub struct NpsLayoutV1;

impl NpsLayoutV1 {
    pub const VERSION: u32 = 1;

    const STATE_MENU: &'static str = ".dropdown-menu.SearchBar-keywordSearch";
    const STATE_MENU_LINKS: &'static str = ".dropdown-menu.SearchBar-keywordSearch a";
    const PARK_LIST: &'static str = "div#parkListResultsArea";
    const PARK_LIST_LINKS: &'static str = "div#parkListResultsArea h3 a";

    fn selector(field: SiteField) -> &'static str {
        match field {
            SiteField::Designation => "span.Hero-designation",
            SiteField::Title => "a.Hero-title",
            SiteField::Locality => r#"span[itemprop="addressLocality"]"#,
            SiteField::Region => r#"span[itemprop="addressRegion"]"#,
            SiteField::PostalCode => "span.postal-code",
            SiteField::Phone => "span.tel",
        }
    }
}

impl MarkupExtractor for NpsLayoutV1 {
    fn version(&self) -> u32 {
        Self::VERSION
    }

    fn state_links(&self, html: &str) -> Result<Vec<Link>, ExtractError> {
        let found = Cell::new(false);
        let links: RefCell<Vec<Link>> = RefCell::new(Vec::new());

        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!(Self::STATE_MENU, |_el| {
                        found.set(true);
                        Ok(())
                    }),
                    element!(Self::STATE_MENU_LINKS, |el| {
                        links.borrow_mut().push(Link {
                            href: el
                                .get_attribute("href")
                                .map(|href| decode_html_entities(&href).into_owned())
                                .unwrap_or_default(),
                            text: String::new(),
                        });
                        Ok(())
                    }),
                    text!(Self::STATE_MENU_LINKS, |t| {
                        if let Some(link) = links.borrow_mut().last_mut() {
                            link.text.push_str(t.as_str());
                        }
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|e| ExtractError::Rewrite(e.to_string()))?;

        if !found.get() {
            return Err(ExtractError::Missing("state menu"));
        }

        Ok(links
            .into_inner()
            .into_iter()
            .filter(|link| !link.href.is_empty())
            .map(|link| Link {
                href: link.href,
                text: clean_text(&link.text),
            })
            .collect())
    }

    fn site_links(&self, html: &str) -> Result<Vec<String>, ExtractError> {
        let found = Cell::new(false);
        let hrefs: RefCell<Vec<String>> = RefCell::new(Vec::new());

        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!(Self::PARK_LIST, |_el| {
                        found.set(true);
                        Ok(())
                    }),
                    element!(Self::PARK_LIST_LINKS, |el| {
                        if let Some(href) = el.get_attribute("href") {
                            hrefs.borrow_mut().push(decode_html_entities(&href).into_owned());
                        }
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|e| ExtractError::Rewrite(e.to_string()))?;

        if !found.get() {
            return Err(ExtractError::Missing("park list"));
        }
        Ok(hrefs.into_inner())
    }

    fn field(&self, html: &str, field: SiteField) -> Result<String, ExtractError> {
        first_text(html, Self::selector(field))?.ok_or(ExtractError::Missing(field.label()))
    }
}

/// Text content of the first element matching `selector`
fn first_text(html: &str, selector: &str) -> Result<Option<String>, ExtractError> {
    let texts: RefCell<Vec<String>> = RefCell::new(Vec::new());

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(selector, |_el| {
                    texts.borrow_mut().push(String::new());
                    Ok(())
                }),
                text!(selector, |t| {
                    if let Some(last) = texts.borrow_mut().last_mut() {
                        last.push_str(t.as_str());
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| ExtractError::Rewrite(e.to_string()))?;

    Ok(texts.into_inner().first().map(|raw| clean_text(raw)))
}

/// Decodes character references and collapses whitespace
///
/// Text chunks from the rewriter are raw source text, entities included.
fn clean_text(raw: &str) -> String {
    decode_html_entities(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
