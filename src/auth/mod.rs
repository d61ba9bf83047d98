//! OAuth2 plumbing: token persistence, the authorization-code flow and
//! callback state tracking

pub mod oauth;
pub mod state;
pub mod token;

pub use oauth::OAuthClient;
pub use state::StateStore;
pub use token::{PersistedToken, TokenStore};

use crate::utils::error::FetchError;
use tracing::{info, warn};

/// Load the persisted token, refreshing and re-saving it when it has expired.
///
/// An expired token without a refresh token is returned unchanged and left
/// for the provider to reject.
pub async fn load_usable_token(
    store: &TokenStore,
    oauth: &OAuthClient,
) -> Result<PersistedToken, FetchError> {
    let token = store.load().await?;
    if !token.is_expired() {
        return Ok(token);
    }
    if token.refresh_token.is_none() {
        warn!("Persisted token has expired and cannot be refreshed");
        return Ok(token);
    }

    let refreshed = oauth.refresh(&token).await?;
    store.save(&refreshed).await?;
    info!("Refreshed expired access token");
    Ok(refreshed)
}
