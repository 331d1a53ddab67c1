use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 12000;
const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/callback";
const DEFAULT_OAUTH_STATE: &str = "secret-key";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Application configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub redirect_uri: String,
    /// Value echoed back through the authorize redirect and checked on `/token`.
    pub oauth_state: String,
    pub api_url: String,
    pub accounts_url: String,
    /// Timeout for outbound Spotify calls. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = var("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let spotify_client_id = var("SPOTIFY_CLIENT_ID")
            .ok_or_else(|| anyhow::anyhow!("SPOTIFY_CLIENT_ID is required"))?;

        let spotify_client_secret = var("SPOTIFY_CLIENT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("SPOTIFY_CLIENT_SECRET is required"))?;

        let redirect_uri =
            var("SPOTIFY_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.into());
        let oauth_state = var("OAUTH_STATE").unwrap_or_else(|| DEFAULT_OAUTH_STATE.into());

        let api_url = var("SPOTIFY_API_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        let accounts_url = var("SPOTIFY_ACCOUNTS_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_ACCOUNTS_URL.into());

        let request_timeout = match var("SPOTIFY_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|_| anyhow::anyhow!("SPOTIFY_TIMEOUT_SECS must be a whole number"))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            port,
            spotify_client_id,
            spotify_client_secret,
            redirect_uri,
            oauth_state,
            api_url,
            accounts_url,
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("SPOTIFY_CLIENT_ID", "id"),
            ("SPOTIFY_CLIENT_SECRET", "secret"),
        ])
        .unwrap();

        assert_eq!(config.port, 12000);
        assert_eq!(config.redirect_uri, "http://localhost:3000/callback");
        assert_eq!(config.oauth_state, "secret-key");
        assert_eq!(config.api_url, "https://api.spotify.com/v1");
        assert_eq!(config.accounts_url, "https://accounts.spotify.com");
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_missing_credentials() {
        let err = load(&[("SPOTIFY_CLIENT_ID", "id")]).unwrap_err();
        assert!(err.to_string().contains("SPOTIFY_CLIENT_SECRET"));

        let err = load(&[("SPOTIFY_CLIENT_SECRET", "secret")]).unwrap_err();
        assert!(err.to_string().contains("SPOTIFY_CLIENT_ID"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SPOTIFY_CLIENT_ID", "id"),
            ("SPOTIFY_CLIENT_SECRET", "secret"),
            ("PORT", "8080"),
            ("SPOTIFY_API_URL", "http://localhost:9000/v1/"),
            ("SPOTIFY_TIMEOUT_SECS", "15"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.api_url, "http://localhost:9000/v1");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = load(&[
            ("SPOTIFY_CLIENT_ID", "id"),
            ("SPOTIFY_CLIENT_SECRET", "secret"),
            ("PORT", "not-a-port"),
        ])
        .unwrap();
        assert_eq!(config.port, 12000);
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let result = load(&[
            ("SPOTIFY_CLIENT_ID", "id"),
            ("SPOTIFY_CLIENT_SECRET", "secret"),
            ("SPOTIFY_TIMEOUT_SECS", "soon"),
        ]);
        assert!(result.is_err());
    }
}
