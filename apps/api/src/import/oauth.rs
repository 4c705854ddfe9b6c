//! Client for the small OAuth backend that holds profiles fetched from the
//! professional network's API. The handshake itself lives in that backend;
//! this side only asks for the authorization URL and reads a cached profile.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::import::ImportError;
use crate::models::ParsedProfile;

const BACKEND_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthUrlResponse {
    pub auth_url: Option<String>,
}

/// Cached user record as returned by `GET /profile/{id}`. Unknown ids come back as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OauthProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
    pub email: Option<String>,
}

impl OauthProfile {
    pub fn is_empty(&self) -> bool {
        self == &OauthProfile::default()
    }

    pub fn into_parsed(self) -> ParsedProfile {
        let mut parsed = ParsedProfile::default();
        let first = self.first_name.unwrap_or_default();
        let last = self.last_name.unwrap_or_default();
        parsed.record.name = format!("{first} {last}").trim().to_string();
        parsed.record.email = self.email.unwrap_or_default();
        parsed.record.current_role = self.headline.unwrap_or_default();
        parsed
    }
}

#[derive(Clone)]
pub struct OauthBackendClient {
    client: Client,
    base_url: String,
}

impl OauthBackendClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn auth_url(&self) -> Result<Option<String>, ImportError> {
        let response: AuthUrlResponse = self
            .client
            .get(format!("{}/auth_url", self.base_url))
            .timeout(BACKEND_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.auth_url)
    }

    pub async fn fetch_profile(&self, profile_id: &str) -> Result<OauthProfile, ImportError> {
        let profile: OauthProfile = self
            .client
            .get(self.profile_url(profile_id)?)
            .timeout(BACKEND_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!("Fetched OAuth profile {profile_id} (empty: {})", profile.is_empty());
        Ok(profile)
    }

    /// `{base}/profile/{id}` with the id percent-encoded as a single path segment.
    fn profile_url(&self, profile_id: &str) -> Result<Url, ImportError> {
        let mut url = Url::parse(&self.base_url).map_err(|_| ImportError::InvalidUrl)?;
        url.path_segments_mut()
            .map_err(|_| ImportError::InvalidUrl)?
            .pop_if_empty()
            .push("profile")
            .push(profile_id);
        Ok(url)
    }
}
