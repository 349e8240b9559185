//! Request signing for the SpinPapi endpoint
//!
//! The signature is an HMAC-SHA256 over `host \n path \n canonical-query`,
//! base64 encoded and appended as the final `signature` parameter.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Result, SpinitronError};
use crate::params::{CanonicalQuery, RequestParams};

type HmacSha256 = Hmac<Sha256>;

/// Timestamp layout expected by the API (UTC, second precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Name of the query parameter carrying the signature
pub const SIGNATURE_KEY: &str = "signature";

/// Identity fields injected into every signed request
#[derive(Debug, Clone)]
pub struct SignerIdentity {
    pub station: String,
    pub user: String,
    pub version: u32,
}

/// Builds canonical queries and signs them with the API secret
#[derive(Debug, Clone)]
pub struct RequestSigner {
    host: String,
    path: String,
    secret: String,
    identity: SignerIdentity,
}

impl RequestSigner {
    /// Create a signer for a fixed host and endpoint path
    ///
    /// # Errors
    /// - `MissingSecret` if `secret` is empty or whitespace only
    pub fn new(
        host: impl Into<String>,
        path: impl Into<String>,
        secret: impl Into<String>,
        identity: SignerIdentity,
    ) -> Result<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(SpinitronError::MissingSecret);
        }

        Ok(Self {
            host: host.into(),
            path: path.into(),
            secret,
            identity,
        })
    }

    /// Injects `method`, `station`, `papiversion` and `papiuser`
    pub fn inject_identity(&self, method: &str, params: &mut RequestParams) {
        params.insert("method", method);
        params.insert("station", self.identity.station.as_str());
        params.insert("papiversion", self.identity.version);
        params.insert("papiuser", self.identity.user.as_str());
    }

    /// Computes the base64 HMAC-SHA256 signature of a canonical query
    ///
    /// # Errors
    /// - `MissingSecret` if no usable key is available
    pub fn sign(&self, query: &CanonicalQuery) -> Result<String> {
        if self.secret.is_empty() {
            return Err(SpinitronError::MissingSecret);
        }

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| SpinitronError::MissingSecret)?;
        mac.update(self.host.as_bytes());
        mac.update(b"\n");
        mac.update(self.path.as_bytes());
        mac.update(b"\n");
        mac.update(query.as_str().as_bytes());

        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Timestamps, canonicalizes and signs already-identified parameters
    ///
    /// Any `signature` key present in `params` is dropped before signing.
    ///
    /// # Returns
    /// The query string to transmit: canonical query followed by `signature=...`
    pub fn signed_query(&self, params: &RequestParams, at: DateTime<Utc>) -> Result<String> {
        let mut params = params.clone();
        params.remove(SIGNATURE_KEY);
        params.insert("timestamp", at.format(TIMESTAMP_FORMAT).to_string());

        let canonical = CanonicalQuery::from_params(&params);
        let signature = self.sign(&canonical)?;
        let encoded = urlencoding::encode(&signature);

        if canonical.is_empty() {
            Ok(format!("{}={}", SIGNATURE_KEY, encoded))
        } else {
            Ok(format!("{}&{}={}", canonical, SIGNATURE_KEY, encoded))
        }
    }

    /// Produces the full signed query for a method call
    ///
    /// # Example
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use spinitron_core::{RequestParams, RequestSigner, SignerIdentity};
    ///
    /// let signer = RequestSigner::new(
    ///     "spinitron.com",
    ///     "/public/spinpapi.php",
    ///     "sekrit",
    ///     SignerIdentity { station: "wxyz".into(), user: "dj@example.com".into(), version: 2 },
    /// ).unwrap();
    /// let at = Utc.with_ymd_and_hms(2014, 2, 1, 12, 0, 0).unwrap();
    /// let query = signer.sign_request("getSong", &RequestParams::new(), at).unwrap();
    /// assert!(query.starts_with("method=getSong&papiuser=dj%40example.com"));
    /// ```
    pub fn sign_request(
        &self,
        method: &str,
        params: &RequestParams,
        at: DateTime<Utc>,
    ) -> Result<String> {
        let mut params = params.clone();
        self.inject_identity(method, &mut params);
        self.signed_query(&params, at)
    }
}
