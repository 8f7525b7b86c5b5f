//! OAuth code exchange for `POST /auth/callback?code=…` (§6).
//!
//! The identity provider's endpoints aren't part of the spec's configuration
//! surface, only the client id/secret/redirect URI are — so the provider's
//! token/user-info URLs are fixed constants here rather than config knobs
//! (documented in DESIGN.md).

use serde::Deserialize;

use crate::errors::AppError;
use crate::state::AppConfig;

const TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const USER_INFO_URL: &str = "https://discord.com/api/users/@me";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    username: String,
    global_name: Option<String>,
    discriminator: String,
}

/// The identity this service actually persists, extracted from the
/// provider's profile payload.
pub struct ExternalIdentity {
    pub external_id: String,
    pub tag: String,
    pub display_name: String,
}

pub async fn exchange_code(
    client: &reqwest::Client,
    config: &AppConfig,
    code: &str,
) -> Result<ExternalIdentity, AppError> {
    let params = [
        ("client_id", config.oauth_client_id.as_str()),
        ("client_secret", config.oauth_client_secret.as_str()),
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.oauth_redirect_uri.as_str()),
    ];

    let token_response = client
        .post(TOKEN_URL)
        .form(&params)
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("oauth token exchange failed: {e}")))?
        .error_for_status()
        .map_err(|e| AppError::Unauthorized(format!("oauth provider rejected code: {e}")))?
        .json::<TokenResponse>()
        .await
        .map_err(|e| AppError::Internal(format!("oauth token response malformed: {e}")))?;

    let provider_user = client
        .get(USER_INFO_URL)
        .bearer_auth(&token_response.access_token)
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("oauth userinfo fetch failed: {e}")))?
        .error_for_status()
        .map_err(|e| AppError::Internal(format!("oauth userinfo rejected: {e}")))?
        .json::<ProviderUser>()
        .await
        .map_err(|e| AppError::Internal(format!("oauth userinfo response malformed: {e}")))?;

    let tag = if provider_user.discriminator == "0" {
        provider_user.username.clone()
    } else {
        format!("{}#{}", provider_user.username, provider_user.discriminator)
    };

    Ok(ExternalIdentity {
        external_id: provider_user.id,
        display_name: provider_user.global_name.unwrap_or(provider_user.username),
        tag,
    })
}
