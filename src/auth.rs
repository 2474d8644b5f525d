use serde::Deserialize;

use crate::config::Config;
use crate::error::AuthError;

/// Bearer token for the vendor API. Fetched once per run and never renewed.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Exchanges the configured credentials for a bearer token.
pub async fn authenticate(http: &reqwest::Client, config: &Config) -> Result<AccessToken, AuthError> {
    let credentials = &config.credentials;
    let form = [
        ("grant_type", "password"),
        ("username", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
        ("scope", credentials.scope.as_str()),
    ];

    let response = http
        .post(config.token_url())
        .header(reqwest::header::AUTHORIZATION, &credentials.client_auth)
        .form(&form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AuthError::Status(status));
    }

    let body = response.bytes().await?;
    let token = serde_json::from_slice::<TokenResponse>(&body)
        .ok()
        .and_then(|r| r.access_token)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    tracing::info!(username = %credentials.username, "obtained access token");
    Ok(AccessToken::new(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_leak_token() {
        let token = AccessToken::new("very-secret".to_string());
        assert_eq!(format!("{token:?}"), "AccessToken(***)");
        assert_eq!(token.secret(), "very-secret");
    }
}
