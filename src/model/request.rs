use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A query parameter value. Parameters seen once collapse to `Single`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum QueryValue {
    Single(String),
    Multi(Vec<String>),
}

impl QueryValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            QueryValue::Single(v) => vec![v.as_str()],
            QueryValue::Multi(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

/// An authenticated call recovered from a captured request.
///
/// Parsed once per run and never mutated; the fetcher only layers its
/// pagination parameters on top when building each page URL.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    pub method: String,

    /// Full URL as captured, including the query string.
    pub url: String,

    /// scheme + host + path, no query.
    pub base_url: String,

    #[serde(default)]
    pub params: BTreeMap<String, QueryValue>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub learning_language: Option<String>,

    #[serde(default)]
    pub from_language: Option<String>,
}
