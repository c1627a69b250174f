//! API domains: the base URL every endpoint of one backend hangs off.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RestKitError;

/// Root of an API. One value per distinct backend or service.
pub trait Domain: Send + Sync {
    fn base_url(&self) -> &Url;

    /// Resolve `api_path` against the base URL.
    ///
    /// An empty path yields the base URL unchanged. Otherwise each
    /// `/`-separated part of the path is appended as a percent-encoded
    /// segment, so `?`, `#` and spaces stay in the path. The base's own
    /// segments, query and fragment are kept.
    fn url_for(&self, api_path: &str) -> Result<Url, RestKitError> {
        let base = self.base_url();
        if api_path.is_empty() {
            return Ok(base.clone());
        }
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| RestKitError::AwkwardUrl(base.to_string()))?
            .pop_if_empty()
            .extend(api_path.trim_start_matches('/').split('/'));
        Ok(url)
    }
}

/// A domain that is nothing more than its base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UrlDomain {
    pub base_url: Url,
}

impl UrlDomain {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    pub fn parse(base_url: &str) -> Result<Self, RestKitError> {
        Ok(Self::new(Url::parse(base_url)?))
    }
}

impl Domain for UrlDomain {
    fn base_url(&self) -> &Url {
        &self.base_url
    }
}
