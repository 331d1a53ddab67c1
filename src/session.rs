//! Cookie-backed token store.
//!
//! `AT` carries the access token, `RT` the refresh token. Handlers behind
//! [`require_token`] receive the access token as an [`AccessToken`]
//! extension instead of reading cookies themselves.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::json;

use crate::error::AppError;
use crate::handlers::AppState;
use crate::spotify::{AccessToken, TokenResponse};

pub const ACCESS_COOKIE: &str = "AT";
pub const REFRESH_COOKIE: &str = "RT";

/// Slightly under Spotify's one hour token lifetime.
const ACCESS_MAX_AGE_SECS: i64 = 3500;

fn cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .build()
}

fn access_cookie(token: &str) -> Cookie<'static> {
    let mut cookie = cookie(ACCESS_COOKIE, token.to_string());
    cookie.set_max_age(time::Duration::seconds(ACCESS_MAX_AGE_SECS));
    cookie
}

fn non_empty<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name).map(|c| c.value()).filter(|v| !v.is_empty())
}

/// Stores a fresh login. The refresh cookie lives for the browser session.
pub fn store_tokens(jar: CookieJar, token: &TokenResponse) -> CookieJar {
    let jar = jar.add(access_cookie(&token.access_token));
    match &token.refresh_token {
        Some(refresh) => jar.add(cookie(REFRESH_COOKIE, refresh.clone())),
        None => jar,
    }
}

pub fn clear_tokens(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((ACCESS_COOKIE, "")).path("/"))
        .remove(Cookie::build((REFRESH_COOKIE, "")).path("/"))
}

/// Gate for routes that call Spotify on the user's behalf.
///
/// With an access token the request goes through. With only a refresh token
/// the access token is renewed and the client is asked to retry (201). With
/// neither the request is rejected.
pub async fn require_token(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = non_empty(&jar, ACCESS_COOKIE) {
        request.extensions_mut().insert(AccessToken::new(token));
        return next.run(request).await;
    }

    let Some(refresh) = non_empty(&jar, REFRESH_COOKIE).map(str::to_owned) else {
        tracing::debug!("neither access nor refresh token present");
        return AppError::Unauthorized("please try to login again".into()).into_response();
    };

    tracing::info!("access token missing, refreshing");
    match state.spotify.refresh_token(&refresh).await {
        Ok(token) => {
            tracing::debug!(
                expires_in = token.expires_in,
                rotated = token.refresh_token.is_some(),
                "access token refreshed"
            );
            let jar = store_tokens(jar, &token);
            (
                StatusCode::CREATED,
                jar,
                Json(json!({ "message": "refreshed token, send request again" })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "token refresh failed");
            AppError::Internal("issue with refresh token".into()).into_response()
        }
    }
}
