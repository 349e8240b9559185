//! Request parameters and canonical query strings
//!
//! Parameters are held in a sorted map, so every serialization derived from
//! them (query string, signature payload, cache fingerprint) is independent of
//! the order in which the caller inserted keys.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpinitronError};
use crate::gateway::CacheTtl;

/// Name of the pseudo-parameter carrying a caller's TTL override
pub const CACHE_OVERRIDE_KEY: &str = "cache";

/// A scalar parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Parses a command-line style value, preferring integers over text
    ///
    /// # Example
    /// ```
    /// use spinitron_core::ParamValue;
    /// assert_eq!(ParamValue::parse_loose("42"), ParamValue::Int(42));
    /// assert_eq!(ParamValue::parse_loose("now"), ParamValue::Text("now".to_string()));
    /// ```
    pub fn parse_loose(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) => ParamValue::Int(n),
            Err(_) => ParamValue::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Mapping of parameter names to scalar values
///
/// Created per call and consumed by the client that sends it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams {
    entries: BTreeMap<String, ParamValue>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    ///
    /// # Example
    /// ```
    /// use spinitron_core::RequestParams;
    /// let params = RequestParams::new().with("PlaylistID", 1234).with("Num", 5);
    /// assert_eq!(params.len(), 2);
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Removes the `cache` pseudo-parameter and interprets it as a TTL
    ///
    /// Returns `Ok(None)` when the caller did not supply an override.
    ///
    /// # Errors
    /// - `InvalidTtl` if the value is negative or not a whole number of milliseconds
    pub fn take_cache_override(&mut self) -> Result<Option<CacheTtl>> {
        let Some(value) = self.entries.remove(CACHE_OVERRIDE_KEY) else {
            return Ok(None);
        };

        let millis = match &value {
            ParamValue::Int(n) => *n,
            ParamValue::Float(x) if x.is_finite() && x.fract() == 0.0 => *x as i64,
            ParamValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| SpinitronError::InvalidTtl(s.clone()))?,
            ParamValue::Float(_) => return Err(SpinitronError::InvalidTtl(value.to_string())),
        };

        if millis < 0 {
            return Err(SpinitronError::InvalidTtl(millis.to_string()));
        }

        Ok(Some(CacheTtl::from_millis(millis as u64)))
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = RequestParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Sorted, percent-encoded `key=value` pairs joined with `&`
///
/// Used verbatim both as the transmitted query and as the signed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalQuery(String);

impl CanonicalQuery {
    /// Builds the canonical form of a parameter set
    ///
    /// Keys and values are percent-encoded per RFC 3986: everything outside
    /// `A-Z a-z 0-9 - _ . ~` is escaped, including `!'()*`.
    ///
    /// # Example
    /// ```
    /// use spinitron_core::{CanonicalQuery, RequestParams};
    /// let params = RequestParams::new().with("b", "x y").with("a", 1);
    /// assert_eq!(CanonicalQuery::from_params(&params).as_str(), "a=1&b=x%20y");
    /// ```
    pub fn from_params(params: &RequestParams) -> Self {
        let query = params
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(&value.to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        Self(query)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
