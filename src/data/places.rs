//! Places API client for points of interest near a site
//!
//! Queries a radius search around a site's postal code. Responses are cached
//! under an identity built from every query parameter except the API key.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{
    or_placeholder, FetchError, NationalSite, NearbyPlace, NO_ADDRESS, NO_CATEGORY, NO_CITY,
    NO_NAME,
};
use crate::cache::{RequestCache, RequestIdentity};

/// Radius search endpoint of the places API
pub const PLACES_BASE_URL: &str = "https://www.mapquestapi.com/search/v2/radius";

/// Default search radius in miles
pub const DEFAULT_RADIUS_MILES: u32 = 10;

/// Default number of results requested
pub const DEFAULT_MAX_MATCHES: u32 = 10;

/// Response from the radius search endpoint
#[derive(Debug, Deserialize)]
struct RadiusResponse {
    #[serde(default)]
    info: Option<ResponseInfo>,
    #[serde(rename = "searchResults", default)]
    search_results: Vec<SearchResult>,
}

/// Request status reported inside the response body
#[derive(Debug, Deserialize)]
struct ResponseInfo {
    #[serde(default)]
    statuscode: i64,
    #[serde(default)]
    messages: Vec<String>,
}

/// A single search result
#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    fields: ResultFields,
}

#[derive(Debug, Default, Deserialize)]
struct ResultFields {
    #[serde(default)]
    group_sic_code_name: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

/// Client for the places radius search
#[derive(Debug, Clone)]
pub struct PlacesClient {
    /// HTTP client for making requests
    http_client: Client,
    /// API credential, sent with every request but never cached
    api_key: String,
    /// Endpoint URL (allows override for testing)
    base_url: String,
    /// Search radius in miles
    radius: u32,
    /// Maximum number of results
    max_matches: u32,
}

impl PlacesClient {
    /// Creates a client for the live API
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: PLACES_BASE_URL.to_string(),
            radius: DEFAULT_RADIUS_MILES,
            max_matches: DEFAULT_MAX_MATCHES,
        }
    }

    /// Points the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_max_matches(mut self, max_matches: u32) -> Self {
        self.max_matches = max_matches;
        self
    }

    /// Query parameters that identify a search, excluding the API key
    fn query_params(&self, origin: &str) -> Vec<(&'static str, String)> {
        vec![
            ("origin", origin.to_string()),
            ("radius", self.radius.to_string()),
            ("units", "m".to_string()),
            ("maxMatches", self.max_matches.to_string()),
            ("ambiguities", "ignore".to_string()),
            ("outFormat", "json".to_string()),
        ]
    }

    /// Fetches places near a site's postal code
    ///
    /// # Returns
    /// * `Ok(Vec<NearbyPlace>)` - All results, in API order
    /// * `Err(FetchError::MissingPostalCode)` - If the site has no postal code
    /// * `Err(FetchError)` - If the request fails or the response is unusable;
    ///   nothing is cached in that case
    pub async fn nearby_places(
        &self,
        cache: &mut RequestCache,
        site: &NationalSite,
    ) -> Result<Vec<NearbyPlace>, FetchError> {
        let origin = site
            .zipcode
            .as_deref()
            .ok_or_else(|| FetchError::MissingPostalCode(site.name.clone()))?;
        let params = self.query_params(origin);
        let identity = RequestIdentity::with_params(&self.base_url, &params);

        let lookup = cache
            .fetch_with_cache(&identity, || self.fetch_from_api(&params))
            .await?;

        parse_places(lookup.value)
    }

    /// Sends the search and validates the body before it can be cached
    async fn fetch_from_api(&self, params: &[(&'static str, String)]) -> Result<Value, FetchError> {
        tracing::debug!(url = %self.base_url, "GET places");
        let body = self
            .http_client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let response: RadiusResponse = serde_json::from_value(body.clone())?;
        if let Some(info) = response.info.filter(|info| info.statuscode != 0) {
            return Err(FetchError::Api {
                code: info.statuscode,
                message: info.messages.join("; "),
            });
        }
        Ok(body)
    }
}

/// Converts a radius search response into places, filling in placeholders
fn parse_places(body: Value) -> Result<Vec<NearbyPlace>, FetchError> {
    let response: RadiusResponse = serde_json::from_value(body)?;
    Ok(response
        .search_results
        .into_iter()
        .map(|result| {
            let fields = result.fields;
            NearbyPlace {
                name: or_placeholder(result.name.as_deref().unwrap_or_default(), NO_NAME),
                category: or_placeholder(
                    fields.group_sic_code_name.as_deref().unwrap_or_default(),
                    NO_CATEGORY,
                ),
                address: or_placeholder(fields.address.as_deref().unwrap_or_default(), NO_ADDRESS),
                city: or_placeholder(fields.city.as_deref().unwrap_or_default(), NO_CITY),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_CACHE_FILENAME;
    use httpmock::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn isle_royale() -> NationalSite {
        NationalSite {
            category: "National Park".to_string(),
            name: "Isle Royale".to_string(),
            address: "Houghton, MI".to_string(),
            zipcode: Some("49931".to_string()),
            phone: "(906) 482-0984".to_string(),
        }
    }

    fn create_test_cache() -> (RequestCache, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = RequestCache::open(temp_dir.path().join(DEFAULT_CACHE_FILENAME));
        (cache, temp_dir)
    }

    fn sample_response() -> Value {
        json!({
            "info": {"statuscode": 0, "messages": []},
            "searchResults": [
                {
                    "name": "Harbor Diner",
                    "fields": {"group_sic_code_name": "Eating Places", "address": "1 Main St", "city": "Houghton"}
                },
                {
                    "name": "Lift Bridge",
                    "fields": {"group_sic_code_name": "", "address": "", "city": ""}
                }
            ]
        })
    }

    #[test]
    fn test_parse_places_substitutes_placeholders() {
        let places = parse_places(sample_response()).unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].info(), "Harbor Diner (Eating Places): 1 Main St, Houghton");
        assert_eq!(places[1].category, "no category");
        assert_eq!(places[1].address, "no address");
        assert_eq!(places[1].city, "no city");
    }

    #[test]
    fn test_parse_places_tolerates_null_fields() {
        let places = parse_places(json!({
            "searchResults": [{"name": "Ferry Dock", "fields": {"address": null}}]
        }))
        .unwrap();

        assert_eq!(places[0].info(), "Ferry Dock (no category): no address, no city");
    }

    #[test]
    fn test_parse_places_without_results() {
        let places = parse_places(json!({"info": {"statuscode": 0}})).unwrap();
        assert!(places.is_empty());
    }

    #[test]
    fn test_parse_places_rejects_wrong_shape() {
        assert!(matches!(
            parse_places(json!("<html>")),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_identity_excludes_api_key() {
        let client = PlacesClient::new("secret-key");
        let identity = RequestIdentity::with_params(&client.base_url, &client.query_params("49931"));

        assert!(!identity.as_str().contains("secret-key"));
        assert_eq!(
            identity.as_str(),
            "https://www.mapquestapi.com/search/v2/radius_ambiguities_ignore_maxMatches_10_origin_49931_outFormat_json_radius_10_units_m"
        );
    }

    #[tokio::test]
    async fn test_nearby_places_queries_once() {
        let server = MockServer::start_async().await;
        let search = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search/v2/radius")
                    .query_param("key", "test-key")
                    .query_param("origin", "49931")
                    .query_param("radius", "10")
                    .query_param("units", "m")
                    .query_param("maxMatches", "10")
                    .query_param("ambiguities", "ignore")
                    .query_param("outFormat", "json");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(sample_response());
            })
            .await;
        let client = PlacesClient::new("test-key").with_base_url(server.url("/search/v2/radius"));
        let (mut cache, temp_dir) = create_test_cache();

        let first = client.nearby_places(&mut cache, &isle_royale()).await.unwrap();
        let second = client.nearby_places(&mut cache, &isle_royale()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        search.assert_calls_async(1).await;

        let written = std::fs::read_to_string(temp_dir.path().join(DEFAULT_CACHE_FILENAME)).unwrap();
        assert!(!written.contains("test-key"), "API key must not be cached");
    }

    #[tokio::test]
    async fn test_api_error_is_not_cached() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search/v2/radius");
                then.status(200).json_body(json!({
                    "info": {"statuscode": 403, "messages": ["The AppKey submitted with this request is invalid."]}
                }));
            })
            .await;
        let client = PlacesClient::new("bad-key").with_base_url(server.url("/search/v2/radius"));
        let (mut cache, _temp_dir) = create_test_cache();

        let err = client
            .nearby_places(&mut cache, &isle_royale())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Api { code: 403, .. }));
        assert!(cache.store().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_not_cached() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search/v2/radius");
                then.status(500);
            })
            .await;
        let client = PlacesClient::new("k").with_base_url(server.url("/search/v2/radius"));
        let (mut cache, _temp_dir) = create_test_cache();

        let err = client
            .nearby_places(&mut cache, &isle_royale())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Http(_)));
        assert!(cache.store().is_empty());
    }

    #[tokio::test]
    async fn test_missing_postal_code() {
        let client = PlacesClient::new("k");
        let (mut cache, _temp_dir) = create_test_cache();
        let site = NationalSite {
            zipcode: None,
            ..isle_royale()
        };

        let err = client.nearby_places(&mut cache, &site).await.unwrap_err();

        assert!(matches!(err, FetchError::MissingPostalCode(name) if name == "Isle Royale"));
    }

    #[test]
    fn test_radius_and_matches_change_identity() {
        let a = PlacesClient::new("k");
        let b = PlacesClient::new("k").with_radius(25).with_max_matches(5);

        let id_a = RequestIdentity::with_params(&a.base_url, &a.query_params("49931"));
        let id_b = RequestIdentity::with_params(&b.base_url, &b.query_params("49931"));

        assert_ne!(id_a, id_b);
    }
}
