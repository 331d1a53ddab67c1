//! Authorization-code flow against the Spotify accounts service.
//!
//! The service never stores tokens itself: the session layer keeps them in
//! cookies and hands an [`AccessToken`] to every API call.

use base64::Engine;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::SpotifyClient;
use crate::config::Config;
use crate::error::SpotifyError;

const SCOPE: &str = "user-read-email user-read-private playlist-modify-public \
    playlist-read-private playlist-modify-private user-top-read";

/// Bearer credential for Spotify Web API calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

/// Settings needed to send a user to Spotify and validate the way back.
#[derive(Clone, Debug)]
pub struct OAuth {
    client_id: String,
    redirect_uri: String,
    state: String,
    accounts_url: String,
}

impl OAuth {
    pub fn new(config: &Config) -> Self {
        Self {
            client_id: config.spotify_client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            state: config.oauth_state.clone(),
            accounts_url: config.accounts_url.clone(),
        }
    }

    /// URL the frontend redirects the user to for consent.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/authorize?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            self.accounts_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPE),
            urlencoding::encode(&self.state),
        )
    }

    pub fn verify_state(&self, state: &str) -> bool {
        self.state == state
    }
}

/// Successful answer from `/api/token`.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Absent on some refresh responses.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// Body Spotify sends with a 400 from `/api/token`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenError {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: String,
}

impl SpotifyClient {
    pub(crate) async fn request_token(
        &self,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse, SpotifyError> {
        let auth = base64::engine::general_purpose::STANDARD.encode(
            format!("{}:{}", self.client_id, self.client_secret).as_bytes(),
        );

        let res = self
            .client
            .post(format!("{}/api/token", self.accounts_url))
            .header("Authorization", format!("Basic {}", auth))
            .form(params)
            .send()
            .await?;

        let status = res.status();
        let body = res.bytes().await?;

        match status {
            StatusCode::OK => Ok(serde_json::from_slice(&body)?),
            StatusCode::BAD_REQUEST => {
                let error: TokenError = serde_json::from_slice(&body)?;
                tracing::warn!(error = %error.error, "token request rejected");
                Err(SpotifyError::Rejected(error))
            }
            _ => Err(SpotifyError::Upstream {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            }),
        }
    }

    pub(crate) async fn exchange_code_for_token(
        &self,
        code: &str,
    ) -> Result<TokenResponse, SpotifyError> {
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    pub(crate) async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, SpotifyError> {
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }
}
