//! HTTP handlers for the Tripify API.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::playlist::{self, PlaylistRequest};
use crate::session;
use crate::spotify::auth::OAuth;
use crate::spotify::{AccessToken, SpotifyApi};

/// Shared state for every route.
#[derive(Clone)]
pub struct AppState {
    pub spotify: Arc<dyn SpotifyApi>,
    pub oauth: Arc<OAuth>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub auth_url: String,
}

/// Body of `POST /token`, relayed by the frontend from the OAuth redirect.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

fn message(text: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": text }))
}

/// GET /healthz - Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "running" }))
}

/// GET /login - Spotify consent URL for the frontend to redirect to.
pub async fn login(State(state): State<AppState>) -> impl IntoResponse {
    Json(LoginResponse {
        auth_url: state.oauth.authorize_url(),
    })
}

/// POST /token - Exchange an authorization code and set the session cookies.
pub async fn token(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) =
        payload.map_err(|_| AppError::BadRequest("error binding request".into()))?;

    if request.code.is_empty() {
        return Err(AppError::BadRequest("code is required".into()));
    }
    if !state.oauth.verify_state(&request.state) {
        return Err(AppError::BadRequest("incorrect state".into()));
    }

    let token = state.spotify.exchange_code(&request.code).await?;
    tracing::info!(scope = %token.scope, expires_in = token.expires_in, "login successful");

    Ok((session::store_tokens(jar, &token), message("Log in successful")))
}

/// GET /logout - Drop the session cookies.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (session::clear_tokens(jar), message("Cookies deleted!"))
}

/// GET /user_profile - The signed-in user's Spotify profile.
pub async fn user_profile(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.spotify.current_user(&token).await?;
    Ok(Json(profile))
}

/// GET /get_top_artists - The signed-in user's top artists.
pub async fn top_artists(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
) -> Result<impl IntoResponse, AppError> {
    let artists = state.spotify.top_artists(&token).await?;
    Ok(Json(artists))
}

/// POST /create_playlist - Build a playlist of roughly `time` seconds.
pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    payload: Result<Json<PlaylistRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) =
        payload.map_err(|e| AppError::BadRequest(format!("error binding request: {}", e)))?;
    tracing::debug!(?request, "create playlist");

    let playlist = playlist::assemble_playlist(state.spotify.as_ref(), &token, &request).await?;
    Ok(Json(playlist))
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/user_profile", get(user_profile))
        .route("/create_playlist", post(create_playlist))
        .route("/get_top_artists", get(top_artists))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_token,
        ));

    Router::new()
        .route("/healthz", get(health))
        .route("/login", get(login))
        .route("/token", post(token))
        .route("/logout", get(logout))
        .merge(authenticated)
        .with_state(state)
}
