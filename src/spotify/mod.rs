//! Spotify Web API client.
//!
//! Uses the Authorization Code flow: every call is made on behalf of the user
//! whose [`AccessToken`] is passed in.

pub mod auth;
#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::config::Config;
use crate::error::SpotifyError;

pub use auth::{AccessToken, TokenResponse};

/// Top-tracks page size used as the playlist candidate pool.
pub const TOP_TRACKS_LIMIT: u32 = 50;

const PLAYLIST_DESCRIPTION: &str = "Created by the Tripify App";

/// Operations the service needs from Spotify.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, SpotifyError>;

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError>;

    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, SpotifyError>;

    async fn top_artists(&self, token: &AccessToken) -> Result<TopArtists, SpotifyError>;

    /// Top tracks in Spotify's ranking order.
    async fn top_tracks(&self, token: &AccessToken, limit: u32) -> Result<Vec<Track>, SpotifyError>;

    /// Creates an empty playlist owned by `user_id`.
    async fn create_playlist(
        &self,
        token: &AccessToken,
        user_id: &str,
        name: &str,
    ) -> Result<Playlist, SpotifyError>;

    /// Appends `uris`, in order, to an existing playlist.
    async fn add_tracks(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError>;
}

/// Spotify API client.
#[derive(Clone)]
pub struct SpotifyClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    api_url: String,
    accounts_url: String,
}

impl SpotifyClient {
    pub fn new(config: &Config) -> Result<Self, SpotifyError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            api_url: config.api_url.clone(),
            accounts_url: config.accounts_url.clone(),
        })
    }

    /// Sends `req` and decodes the body when the status is one of `accepted`.
    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        accepted: &[StatusCode],
    ) -> Result<T, SpotifyError> {
        let body = self.send_raw(req, accepted).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_raw(
        &self,
        req: RequestBuilder,
        accepted: &[StatusCode],
    ) -> Result<Vec<u8>, SpotifyError> {
        let res = req.send().await?;
        let status = res.status();
        let body = res.bytes().await?;

        if !accepted.contains(&status) {
            let body = String::from_utf8_lossy(&body).into_owned();
            tracing::warn!(%status, %body, "Spotify API error");
            return Err(SpotifyError::Upstream { status, body });
        }
        Ok(body.to_vec())
    }

    fn get(&self, token: &AccessToken, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.api_url, path))
            .header("Authorization", token.bearer())
    }

    fn post(&self, token: &AccessToken, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.api_url, path))
            .header("Authorization", token.bearer())
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, SpotifyError> {
        self.exchange_code_for_token(code).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError> {
        self.refresh_access_token(refresh_token).await
    }

    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, SpotifyError> {
        self.send(self.get(token, "/me"), &[StatusCode::OK]).await
    }

    async fn top_artists(&self, token: &AccessToken) -> Result<TopArtists, SpotifyError> {
        self.send(self.get(token, "/me/top/artists"), &[StatusCode::OK])
            .await
    }

    async fn top_tracks(&self, token: &AccessToken, limit: u32) -> Result<Vec<Track>, SpotifyError> {
        let path = format!("/me/top/tracks?limit={}", limit);
        let page: TopTracks = self.send(self.get(token, &path), &[StatusCode::OK]).await?;
        Ok(page.items)
    }

    async fn create_playlist(
        &self,
        token: &AccessToken,
        user_id: &str,
        name: &str,
    ) -> Result<Playlist, SpotifyError> {
        let path = format!("/users/{}/playlists", urlencoding::encode(user_id));
        let req = self.post(token, &path).json(&json!({
            "name": name,
            "description": PLAYLIST_DESCRIPTION,
        }));

        // Spotify answers 201, older deployments 200.
        self.send(req, &[StatusCode::OK, StatusCode::CREATED]).await
    }

    async fn add_tracks(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError> {
        let path = format!("/playlists/{}/tracks", urlencoding::encode(playlist_id));
        let req = self.post(token, &path).json(&json!({ "uris": uris }));

        self.send_raw(req, &[StatusCode::OK, StatusCode::CREATED])
            .await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct TopTracks {
    #[serde(default)]
    items: Vec<Track>,
}

/// A playlist candidate. Only the fields the assembler reads.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Track {
    #[serde(default)]
    pub duration_ms: f64,
    #[serde(default)]
    pub uri: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Playlist {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub display_name: Option<String>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Image {
    pub height: Option<u32>,
    pub width: Option<u32>,
    #[serde(default)]
    pub url: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TopArtists {
    #[serde(default)]
    pub items: Vec<Artist>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uri: String,
}
