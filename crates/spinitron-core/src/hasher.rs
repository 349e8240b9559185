//! Cache key fingerprints for parameter sets

use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

use crate::params::{CanonicalQuery, RequestParams};

/// Namespace tag prefixed to every cache key
pub const CACHE_NAMESPACE: &str = "SpinPapiCache-";

/// Computes a deterministic fingerprint of a parameter set
///
/// Hashes the canonical (sorted, percent-encoded) query form, so two
/// parameter sets with the same logical content always share a fingerprint.
pub fn fingerprint(params: &RequestParams) -> String {
    let canonical = CanonicalQuery::from_params(params);

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_str().as_bytes());

    STANDARD.encode(hasher.finalize())
}

/// Builds the namespaced cache key for a parameter set
///
/// # Example
/// ```
/// use spinitron_core::{cache_key, RequestParams};
/// let key = cache_key(&RequestParams::new().with("method", "getSong"));
/// assert!(key.starts_with("SpinPapiCache-"));
/// ```
pub fn cache_key(params: &RequestParams) -> String {
    format!("{}{}", CACHE_NAMESPACE, fingerprint(params))
}
