//! Destination URL resolution.
//!
//! # Responsibilities
//! - Map an inbound relay path to a pre-authorized destination write URL
//!
//! # Design Decisions
//! - Resolution is pure and local: no network, no credential handling
//! - The caller supplies the signature (SAS query); it is carried over verbatim
//! - Only the path names the destination, and the account segment is checked
//!   so the caller cannot point the write at an arbitrary host

use axum::http::Uri;
use thiserror::Error;
use url::Url;

use crate::config::DestinationConfig;

/// Placeholder in the endpoint template that receives the account name.
pub const ACCOUNT_PLACEHOLDER: &str = "{account}";

/// Why a relay path could not be resolved to a destination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DestinationError {
    #[error("path is not under {0}")]
    Prefix(String),

    #[error("missing storage account in path")]
    MissingAccount,

    #[error("invalid storage account name '{0}'")]
    InvalidAccount(String),

    #[error("missing container and blob in path")]
    MissingBlob,

    #[error("destination URL is malformed: {0}")]
    Url(String),
}

/// Produces the fully-qualified, pre-authorized URL for a destination write.
pub trait DestinationResolver: Send + Sync + std::fmt::Debug {
    /// Resolve the inbound request URI (path and query).
    fn resolve(&self, uri: &Uri) -> Result<Url, DestinationError>;

    /// Check the shape of the path without producing a URL.
    ///
    /// Runs before the source fetch, so a path that can never resolve costs
    /// no network call.
    fn check_path(&self, _uri: &Uri) -> Result<(), DestinationError> {
        Ok(())
    }
}

/// Resolves `{prefix}{account}/{container}/{blob}?{sas}` against an Azure
/// Blob Storage endpoint template.
#[derive(Debug, Clone)]
pub struct AzureBlobResolver {
    prefix: String,
    endpoint: String,
}

impl AzureBlobResolver {
    /// Create a resolver for paths under `prefix`.
    pub fn new(prefix: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a resolver from configuration.
    pub fn from_config(prefix: &str, config: &DestinationConfig) -> Self {
        Self::new(prefix, config.endpoint.clone())
    }

    /// Split the path into its account and `container/blob` parts.
    fn split_path<'a>(&self, uri: &'a Uri) -> Result<(&'a str, &'a str), DestinationError> {
        let rest = uri
            .path()
            .strip_prefix(&self.prefix)
            .ok_or_else(|| DestinationError::Prefix(self.prefix.clone()))?;

        let (account, blob_path) = rest.split_once('/').unwrap_or((rest, ""));
        if account.is_empty() {
            return Err(DestinationError::MissingAccount);
        }
        if !is_account_name(account) {
            return Err(DestinationError::InvalidAccount(account.to_string()));
        }
        if blob_path.is_empty() {
            return Err(DestinationError::MissingBlob);
        }

        Ok((account, blob_path))
    }
}

impl DestinationResolver for AzureBlobResolver {
    fn resolve(&self, uri: &Uri) -> Result<Url, DestinationError> {
        let (account, blob_path) = self.split_path(uri)?;

        let base = self.endpoint.replace(ACCOUNT_PLACEHOLDER, account);
        let mut url = Url::parse(&format!("{}/{}", base.trim_end_matches('/'), blob_path))
            .map_err(|e| DestinationError::Url(e.to_string()))?;
        url.set_query(uri.query());

        Ok(url)
    }

    fn check_path(&self, uri: &Uri) -> Result<(), DestinationError> {
        self.split_path(uri).map(|_| ())
    }
}

/// Storage account names are 3-24 lowercase letters and digits.
fn is_account_name(name: &str) -> bool {
    (3..=24).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// The URL without its query string, for logging.
pub fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}
