//! Park service site client
//!
//! Scrapes the state directory, per-state site lists and individual site pages.
//! Every page goes through the request cache keyed by its URL.

use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

use super::markup::{ExtractError, MarkupExtractor, NpsLayoutV1, SiteField};
use super::{
    expect_text, or_placeholder, FetchError, NationalSite, NO_ADDRESS, NO_CATEGORY, NO_NAME,
    NO_PHONE,
};
use crate::cache::{RequestCache, RequestIdentity};

/// Base URL of the park service site
pub const NPS_BASE_URL: &str = "https://www.nps.gov";

/// Path of the page carrying the state menu
const DIRECTORY_PATH: &str = "/index.htm";

/// Page appended to each site link
const SITE_INDEX_PAGE: &str = "index.htm";

/// A state as listed in the directory menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    /// Name as the site spells it, e.g. "Michigan"
    pub name: String,
    /// Absolute URL of the state's page
    pub url: String,
}

/// States keyed by lowercase name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDirectory {
    states: BTreeMap<String, StateEntry>,
}

impl StateDirectory {
    /// Looks up a state by name, ignoring case and surrounding whitespace
    pub fn lookup(&self, state_name: &str) -> Option<&StateEntry> {
        self.states.get(&state_name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Collects `(name, url)` pairs, keeping the name's original spelling for display
impl FromIterator<(String, String)> for StateDirectory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            states: iter
                .into_iter()
                .map(|(name, url)| (name.to_lowercase(), StateEntry { name, url }))
                .collect(),
        }
    }
}

/// Client for the park service site
#[derive(Debug, Clone)]
pub struct NpsClient<M = NpsLayoutV1> {
    /// HTTP client for making requests
    http_client: Client,
    /// Site root that state and site links are resolved against
    base_url: String,
    /// Extractor for the current page layout
    markup: M,
}

impl NpsClient {
    /// Creates a client for the live site
    pub fn new() -> Self {
        Self::with_base_url(NPS_BASE_URL)
    }

    /// Creates a client against a different site root (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
            markup: NpsLayoutV1,
        }
    }
}

impl Default for NpsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MarkupExtractor> NpsClient<M> {
    /// Swaps in an extractor for a different page layout
    pub fn with_markup<N: MarkupExtractor>(self, markup: N) -> NpsClient<N> {
        NpsClient {
            http_client: self.http_client,
            base_url: self.base_url,
            markup,
        }
    }

    /// Fetches the state menu and maps each state name to its page URL
    pub async fn state_directory(
        &self,
        cache: &mut RequestCache,
    ) -> Result<StateDirectory, FetchError> {
        let base = self.base()?;
        let url = base.join(DIRECTORY_PATH)?;
        let html = self
            .fetch_page(cache, &url, |page| self.markup.state_links(page).map(|_| ()))
            .await?;

        self.markup
            .state_links(&html)?
            .into_iter()
            .filter(|link| !link.text.is_empty())
            .map(|link| -> Result<(String, String), FetchError> {
                let state_url = base.join(&link.href)?;
                Ok((link.text, state_url.to_string()))
            })
            .collect()
    }

    /// Fetches a state page and builds a record for every site it lists
    pub async fn sites_for_state(
        &self,
        cache: &mut RequestCache,
        state_url: &str,
    ) -> Result<Vec<NationalSite>, FetchError> {
        let base = self.base()?;
        let url = Url::parse(state_url)?;
        let html = self
            .fetch_page(cache, &url, |page| self.markup.site_links(page).map(|_| ()))
            .await?;

        let mut sites = Vec::new();
        for href in self.markup.site_links(&html)? {
            let site_url = base.join(&href)?.join(SITE_INDEX_PAGE)?;
            sites.push(self.site(cache, site_url.as_str()).await?);
        }
        Ok(sites)
    }

    /// Fetches a single site page and builds its record
    pub async fn site(
        &self,
        cache: &mut RequestCache,
        site_url: &str,
    ) -> Result<NationalSite, FetchError> {
        let url = Url::parse(site_url)?;
        // Missing fields fall back to placeholders, so any page is usable
        let html = self.fetch_page(cache, &url, |_| Ok(())).await?;
        Ok(self.parse_site(&html, site_url))
    }

    fn base(&self) -> Result<Url, FetchError> {
        Ok(Url::parse(&self.base_url)?)
    }

    /// Builds a site record, substituting placeholders for missing fields
    fn parse_site(&self, html: &str, site_url: &str) -> NationalSite {
        let field = |field: SiteField| -> Option<String> {
            match self.markup.field(html, field) {
                Ok(text) if !text.trim().is_empty() => Some(text),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(
                        site = site_url,
                        layout = self.markup.version(),
                        error = %e,
                        "Using placeholder"
                    );
                    None
                }
            }
        };

        let address = match (field(SiteField::Locality), field(SiteField::Region)) {
            (Some(city), Some(region)) => format!("{}, {}", city, region),
            (Some(part), None) | (None, Some(part)) => part,
            (None, None) => NO_ADDRESS.to_string(),
        };

        NationalSite {
            category: or_placeholder(
                &field(SiteField::Designation).unwrap_or_default(),
                NO_CATEGORY,
            ),
            name: or_placeholder(&field(SiteField::Title).unwrap_or_default(), NO_NAME),
            address,
            zipcode: field(SiteField::PostalCode),
            phone: or_placeholder(&field(SiteField::Phone).unwrap_or_default(), NO_PHONE),
        }
    }

    /// Returns a page's markup, from the cache when possible
    ///
    /// A freshly fetched page is only cached once `check` accepts it, so an
    /// error or maintenance page served with a 2xx status is never stored.
    async fn fetch_page<C>(
        &self,
        cache: &mut RequestCache,
        url: &Url,
        check: C,
    ) -> Result<String, FetchError>
    where
        C: FnOnce(&str) -> Result<(), ExtractError>,
    {
        let identity = RequestIdentity::new(url.as_str());
        let lookup = cache
            .fetch_with_cache(&identity, || async move {
                tracing::debug!(%url, "GET page");
                let text = self
                    .http_client
                    .get(url.clone())
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                check(&text)?;
                Ok::<_, FetchError>(Value::String(text))
            })
            .await?;
        expect_text(lookup.value, identity.as_str())
    }
}
