//! Core data models for national park sites and nearby places
//!
//! This module contains the records shown to the user and the clients that
//! produce them. Both clients fetch through a [`RequestCache`](crate::cache::RequestCache)
//! so repeated queries never hit the network twice.

pub mod markup;
pub mod nps;
pub mod places;

pub use markup::{ExtractError, Link, MarkupExtractor, NpsLayoutV1, SiteField};
pub use nps::{NpsClient, StateDirectory, StateEntry};
pub use places::PlacesClient;

use serde_json::Value;
use thiserror::Error;

use crate::cache::CacheError;

pub const NO_CATEGORY: &str = "no category";
pub const NO_NAME: &str = "no name";
pub const NO_ADDRESS: &str = "no address";
pub const NO_CITY: &str = "no city";
pub const NO_ZIPCODE: &str = "no zipcode";
pub const NO_PHONE: &str = "no phone";

/// Errors that can occur when fetching or interpreting site and place data
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed or returned a non-success status
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A locator could not be built or resolved
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The places API answered with an error status in its body
    #[error("Places API returned status {code}: {message}")]
    Api { code: i64, message: String },

    /// The places response did not have the expected shape
    #[error("Failed to parse places response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A cached payload has the wrong type for the request
    #[error("Unexpected cached payload for {0}")]
    UnexpectedPayload(String),

    /// Page markup is missing a structural element
    #[error("Failed to read page: {0}")]
    Markup(#[from] ExtractError),

    /// Nearby search needs a postal code the site page didn't provide
    #[error("No postal code known for {0}")]
    MissingPostalCode(String),

    /// The cache could not be saved
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl FetchError {
    /// Whether the session can report this error and carry on
    ///
    /// Network, API and cache-write failures are fatal; problems with a single
    /// page's structure or a site lacking a postal code are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FetchError::Markup(_)
                | FetchError::MissingPostalCode(_)
                | FetchError::UnexpectedPayload(_)
        )
    }
}

/// A national park site as listed on its own page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NationalSite {
    /// Designation, e.g. "National Park" (placeholder if blank)
    pub category: String,
    /// Site name, e.g. "Isle Royale"
    pub name: String,
    /// City and state, e.g. "Houghton, MI"
    pub address: String,
    /// Postal code, e.g. "49931" or "82190-0168"
    pub zipcode: Option<String>,
    /// Phone number, e.g. "(906) 482-0984"
    pub phone: String,
}

impl NationalSite {
    /// One-line summary: `name (category): address zipcode`
    pub fn info(&self) -> String {
        format!(
            "{} ({}): {} {}",
            self.name,
            self.category,
            self.address,
            self.zipcode.as_deref().unwrap_or(NO_ZIPCODE)
        )
    }
}

/// A point of interest returned by the places API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearbyPlace {
    pub name: String,
    pub category: String,
    pub address: String,
    pub city: String,
}

impl NearbyPlace {
    /// One-line summary: `name (category): address, city`
    pub fn info(&self) -> String {
        format!(
            "{} ({}): {}, {}",
            self.name, self.category, self.address, self.city
        )
    }
}

/// Returns the trimmed text, or `placeholder` when it is empty
pub(crate) fn or_placeholder(text: &str, placeholder: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Extracts a markup payload from a cached value
pub(crate) fn expect_text(value: Value, identity: &str) -> Result<String, FetchError> {
    match value {
        Value::String(text) => Ok(text),
        _ => Err(FetchError::UnexpectedPayload(identity.to_string())),
    }
}
