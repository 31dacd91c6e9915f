//! Loads a valid Google session (access token) that we can use to call the Calendar API.
//!
//! Sessions are created outside confcal (any OAuth tool that writes the three
//! fields below will do) and stored at
//!   ~/.config/confcal/providers/google/session/{account}.toml
//! An expired access token is refreshed once and written back.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app_config::{AppConfig, base_dir};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_SESSION: &str = "default";

pub struct Session {
    /// Where the session is persisted; `None` for in-memory sessions.
    path: Option<PathBuf>,
    data: SessionData,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl Session {
    fn path_for_account(account: Option<&str>) -> Result<PathBuf> {
        let slug = account
            .unwrap_or(DEFAULT_SESSION)
            .replace(['/', '\\', ':'], "_");

        Ok(base_dir()?.join("session").join(format!("{}.toml", slug)))
    }

    /// An in-memory session around an already valid access token. Never saved.
    pub fn from_access_token(access_token: &str) -> Self {
        Session {
            path: None,
            data: SessionData {
                access_token: access_token.to_string(),
                refresh_token: String::new(),
                expires_at: Utc::now() + Duration::days(365),
            },
        }
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    /// Load the stored session for `account` and refresh it if expired.
    pub async fn load_valid(account: Option<&str>) -> Result<Self> {
        let mut session = Self::load_from(&Self::path_for_account(account)?)?;

        if session.is_expired() {
            let app_config = AppConfig::load()?;
            session.refresh_at(TOKEN_URL, &app_config).await?;
        }

        Ok(session)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Google session not found at {}", path.display());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read Google session from {}", path.display()))?;

        let data: SessionData = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse Google session from {}", path.display()))?;

        Ok(Session {
            path: Some(path.to_path_buf()),
            data,
        })
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;

        // Set to owner-only (0600) since file contains OAuth tokens:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.data.expires_at
    }

    async fn refresh_at(&mut self, token_url: &str, app_config: &AppConfig) -> Result<()> {
        info!("Access token expired, refreshing");

        let response = reqwest::Client::new()
            .post(token_url)
            .form(&[
                ("client_id", app_config.client_id.as_str()),
                ("client_secret", app_config.client_secret.as_str()),
                ("refresh_token", self.data.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("Failed to send token refresh request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to refresh Google access token: {}", error_text);
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .context("Failed to parse token refresh response")?;

        self.data.access_token = refreshed.access_token;
        self.data.expires_at = Utc::now() + Duration::seconds(refreshed.expires_in);
        // Google typically doesn't return a new refresh_token on refresh
        if let Some(refresh_token) = refreshed.refresh_token.filter(|t| !t.is_empty()) {
            self.data.refresh_token = refresh_token;
        }
        self.save()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_session(dir: &Path, expires_at: &str) -> PathBuf {
        let path = dir.join("session").join("default.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            format!(
                "access_token = \"old-token\"\nrefresh_token = \"refresh-me\"\nexpires_at = \"{expires_at}\"\n"
            ),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_load_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_session(dir.path(), "2999-01-01T00:00:00Z");

        let session = Session::load_from(&path).unwrap();
        assert_eq!(session.access_token(), "old-token");
        assert!(!session.is_expired());
    }

    #[test]
    fn test_missing_session() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Session::load_from(&dir.path().join("nope.toml")).is_err());
    }

    #[tokio::test]
    async fn test_refresh_expired_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "new-token",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = write_session(dir.path(), "2000-01-01T00:00:00Z");
        let mut session = Session::load_from(&path).unwrap();
        assert!(session.is_expired());

        let app_config = AppConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
        };
        session
            .refresh_at(&format!("{}/token", server.uri()), &app_config)
            .await
            .unwrap();

        assert_eq!(session.access_token(), "new-token");
        assert!(!session.is_expired());

        let reloaded = Session::load_from(&path).unwrap();
        assert_eq!(reloaded.access_token(), "new-token");
        assert_eq!(reloaded.data.refresh_token, "refresh-me");
    }
}
