//! Client identifier extraction.

use axum::extract::Query;
use axum::http::{HeaderMap, Uri};

pub const DEFAULT_QUERY_PARAM: &str = "id";

/// Where the rate-limit identifier is read from.
///
/// A missing or unreadable identifier is not an error: it becomes the empty
/// string, so every such request shares one counter. That fallback is coarse
/// and callers relying on it in production should pick a source every client
/// actually sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierSource {
    /// First value of a query-string parameter.
    Query(String),
    /// Value of a request header.
    Header(String),
}

impl Default for IdentifierSource {
    fn default() -> Self {
        Self::Query(DEFAULT_QUERY_PARAM.to_string())
    }
}

impl IdentifierSource {
    pub fn extract(&self, uri: &Uri, headers: &HeaderMap) -> String {
        match self {
            Self::Query(name) => Self::from_query(uri, name),
            Self::Header(name) => headers
                .get(name.as_str())
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .unwrap_or_default(),
        }
    }

    fn from_query(uri: &Uri, name: &str) -> String {
        let Ok(Query(pairs)) = Query::<Vec<(String, String)>>::try_from_uri(uri) else {
            return String::new();
        };
        pairs
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
            .unwrap_or_default()
    }
}
