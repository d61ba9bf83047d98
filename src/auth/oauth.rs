//! OAuth2 authorization-code flow against Google's endpoints

use crate::auth::token::PersistedToken;
use crate::utils::config::OAuthSettings;
use crate::utils::error::FetchError;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};
use url::Url;

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    /// Providers often omit the refresh token on refresh; keep the old one then
    fn into_token(self, previous_refresh: Option<String>) -> PersistedToken {
        PersistedToken {
            access_token: self.access_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: self.refresh_token.or(previous_refresh),
            expiry: self
                .expires_in
                .filter(|secs| *secs > 0)
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

pub struct OAuthClient {
    settings: OAuthSettings,
    http: Client,
}

impl OAuthClient {
    pub fn new(settings: OAuthSettings, http: Client) -> Self {
        Self { settings, http }
    }

    /// Consent page URL for `state`, requesting offline access
    pub fn authorize_url(&self, state: &str) -> Result<String, FetchError> {
        let scopes = self.settings.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.settings.auth_url,
            &[
                ("client_id", self.settings.client_id.as_str()),
                ("redirect_uri", self.settings.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", scopes.as_str()),
                ("state", state),
                ("access_type", "offline"),
            ],
        )
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.settings.auth_url, e)))?;
        Ok(url.into())
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<PersistedToken, FetchError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("redirect_uri", self.settings.redirect_url.as_str()),
        ];

        info!("Exchanging authorization code for tokens");
        let response = self.request_token(&params).await?;
        Ok(response.into_token(None))
    }

    /// Refresh an access token using its refresh token
    pub async fn refresh(&self, token: &PersistedToken) -> Result<PersistedToken, FetchError> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| FetchError::OAuthError("token has no refresh token".to_string()))?;
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
        ];

        info!("Refreshing access token");
        let response = self.request_token(&params).await?;
        Ok(response.into_token(token.refresh_token.clone()))
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, FetchError> {
        let response = self
            .http
            .post(&self.settings.token_url)
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Token request failed: {} - {}", status, body);
            return Err(FetchError::OAuthError(format!(
                "token endpoint returned {}",
                status
            )));
        }

        Ok(response.json().await?)
    }
}
