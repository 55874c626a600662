//! Request identity used as the cache key

use std::fmt;

/// Deterministic cache key for a single logical request
///
/// Built from the request locator and its parameters. Parameters are sorted by
/// key (then value) before being joined, so the same request always yields the
/// same identity regardless of the order the parameters were supplied in.
/// Credentials must not be passed in; they are not part of a request's
/// identity and would otherwise end up in the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestIdentity(String);

impl RequestIdentity {
    /// Identity of a request described entirely by its locator (e.g., a page URL)
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Identity of a request with query parameters
    ///
    /// Produces `locator_key1_value1_key2_value2`, keys in ascending order.
    pub fn with_params<K, V>(locator: &str, params: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pairs: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect();
        pairs.sort();

        let mut key = locator.to_string();
        for (k, v) in pairs {
            key.push('_');
            key.push_str(k);
            key.push('_');
            key.push_str(v);
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
