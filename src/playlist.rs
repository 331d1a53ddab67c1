//! Duration-targeted playlist assembly.
//!
//! A playlist is built from the user's top tracks, in Spotify's ranking
//! order, until the running total reaches the requested length. The check
//! happens before each track is added, so the result can overshoot the
//! target by up to one track ("reach or exceed", never "stay under").

use serde::Deserialize;

use crate::error::SpotifyError;
use crate::spotify::{AccessToken, Playlist, SpotifyApi, Track, TOP_TRACKS_LIMIT};

/// Body of `POST /create_playlist`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistRequest {
    /// Target length in seconds. Track durations arrive in milliseconds.
    #[serde(default)]
    pub time: i64,
    /// Spotify user id that will own the playlist.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Picks track URIs, in candidate order, while the accumulated length is
/// still below `target_secs`.
///
/// Every candidate is visited. Durations and URIs are taken as-is.
pub fn select_tracks(target_secs: i64, candidates: &[Track]) -> Vec<String> {
    let target = target_secs as f64;
    let mut accumulated = 0.0;
    let mut uris = Vec::new();

    for track in candidates {
        if accumulated < target {
            uris.push(track.uri.clone());
            accumulated += track.duration_ms / 1000.0;
        }
    }

    uris
}

/// Creates a playlist, fills it from the user's top tracks and returns it.
///
/// Calls run strictly in order: create, fetch candidates, populate. The
/// first failure stops the chain; a failure after creation leaves the new
/// playlist empty on Spotify.
pub async fn assemble_playlist(
    spotify: &dyn SpotifyApi,
    token: &AccessToken,
    request: &PlaylistRequest,
) -> Result<Playlist, SpotifyError> {
    let playlist = spotify
        .create_playlist(token, &request.id, &request.title)
        .await?;
    tracing::info!(playlist_id = %playlist.id, user = %request.id, "created playlist");

    let candidates = match spotify.top_tracks(token, TOP_TRACKS_LIMIT).await {
        Ok(tracks) => tracks,
        Err(e) => {
            tracing::warn!(playlist_id = %playlist.id, "could not fetch top tracks, playlist left empty");
            return Err(e);
        }
    };

    let uris = select_tracks(request.time, &candidates);
    tracing::debug!(
        target_secs = request.time,
        candidates = candidates.len(),
        selected = uris.len(),
        "selected tracks"
    );

    if let Err(e) = spotify.add_tracks(token, &playlist.id, &uris).await {
        tracing::warn!(playlist_id = %playlist.id, "could not populate playlist");
        return Err(e);
    }
    tracing::info!(playlist_id = %playlist.id, tracks = uris.len(), "populated playlist");

    Ok(playlist)
}
