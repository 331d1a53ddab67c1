//! In-memory [`SpotifyApi`] used by tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::auth::TokenError;
use super::{
    AccessToken, ExternalUrls, Playlist, SpotifyApi, TokenResponse, TopArtists, Track, UserProfile,
};
use crate::error::SpotifyError;

pub const GOOD_CODE: &str = "good-code";
pub const DENIED_CODE: &str = "denied-code";
pub const GOOD_REFRESH: &str = "good-refresh";
/// Refresh token whose exchange also hands back a new refresh token.
pub const ROTATING_REFRESH: &str = "rotating-refresh";

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreatePlaylist { user_id: String, name: String },
    TopTracks { limit: u32 },
    AddTracks { playlist_id: String, uris: Vec<String> },
}

#[derive(Default)]
pub struct FakeSpotify {
    pub tracks: Vec<Track>,
    pub create_status: Option<StatusCode>,
    pub top_tracks_status: Option<StatusCode>,
    pub add_status: Option<StatusCode>,
    pub calls: Mutex<Vec<Call>>,
    pub next_id: AtomicUsize,
}

impl FakeSpotify {
    pub fn with_tracks(durations_ms: &[f64]) -> Self {
        let tracks = durations_ms
            .iter()
            .enumerate()
            .map(|(i, &duration_ms)| Track {
                duration_ms,
                uri: format!("spotify:track:{}", i + 1),
            })
            .collect();
        Self {
            tracks,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn failure(status: StatusCode) -> SpotifyError {
    SpotifyError::Upstream {
        status,
        body: String::new(),
    }
}

fn token(access: &str, refresh: Option<&str>) -> TokenResponse {
    TokenResponse {
        access_token: access.into(),
        refresh_token: refresh.map(Into::into),
        scope: "user-top-read".into(),
        expires_in: 3600,
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, SpotifyError> {
        match code {
            GOOD_CODE => Ok(token("access-token", Some("refresh-token"))),
            DENIED_CODE => Err(SpotifyError::Rejected(TokenError {
                error: "invalid_grant".into(),
                error_description: "Invalid authorization code".into(),
            })),
            _ => Err(failure(StatusCode::SERVICE_UNAVAILABLE)),
        }
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError> {
        match refresh_token {
            GOOD_REFRESH => Ok(token("fresh-token", None)),
            ROTATING_REFRESH => Ok(token("fresh-token", Some("rotated-refresh"))),
            _ => Err(failure(StatusCode::BAD_REQUEST)),
        }
    }

    async fn current_user(&self, _token: &AccessToken) -> Result<UserProfile, SpotifyError> {
        Ok(UserProfile {
            display_name: Some("Test User".into()),
            id: "test-user".into(),
            images: vec![],
        })
    }

    async fn top_artists(&self, _token: &AccessToken) -> Result<TopArtists, SpotifyError> {
        Ok(TopArtists::default())
    }

    async fn top_tracks(&self, _token: &AccessToken, limit: u32) -> Result<Vec<Track>, SpotifyError> {
        self.record(Call::TopTracks { limit });
        match self.top_tracks_status {
            Some(status) => Err(failure(status)),
            None => Ok(self.tracks.clone()),
        }
    }

    async fn create_playlist(
        &self,
        _token: &AccessToken,
        user_id: &str,
        name: &str,
    ) -> Result<Playlist, SpotifyError> {
        self.record(Call::CreatePlaylist {
            user_id: user_id.into(),
            name: name.into(),
        });
        if let Some(status) = self.create_status {
            return Err(failure(status));
        }

        let id = format!("playlist-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        Ok(Playlist {
            external_urls: ExternalUrls {
                spotify: format!("https://open.spotify.com/playlist/{}", id),
            },
            id,
            name: name.into(),
        })
    }

    async fn add_tracks(
        &self,
        _token: &AccessToken,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError> {
        self.record(Call::AddTracks {
            playlist_id: playlist_id.into(),
            uris: uris.to_vec(),
        });
        match self.add_status {
            Some(status) => Err(failure(status)),
            None => Ok(()),
        }
    }
}
