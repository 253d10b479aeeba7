//! OAuth authorization-code exchange.
//!
//! The operator opens the authorize URL, grants access, and pastes the code
//! back. The code is exchanged for an access token at the token endpoint.

use std::fmt;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::AuthError;

const MIN_CODE_LEN: usize = 10;
const MAX_CODE_LEN: usize = 20;
const APP_FOLDER_SCOPE: &str = "cloud_api:disk.app_folder";

/// An access token for the remote store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("OAuth {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Supplies an authorization code for a given authorize URL.
///
/// The CLI implements this by prompting on stdin; tests and `--code` use
/// [`FixedCode`].
pub trait CodeSource {
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCode` if no usable code was obtained.
    fn authorization_code(&mut self, authorize_url: &str) -> Result<String, AuthError>;
}

/// A code known up front.
#[derive(Debug, Clone)]
pub struct FixedCode(pub String);

impl CodeSource for FixedCode {
    fn authorization_code(&mut self, _authorize_url: &str) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

/// Check an authorization code: 10 to 20 ASCII letters or digits.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns `AuthError::InvalidCode` describing the violated rule.
pub fn validate_code(code: &str) -> Result<&str, AuthError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AuthError::InvalidCode("code cannot be empty".into()));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AuthError::InvalidCode(
            "code may contain only latin letters and digits".into(),
        ));
    }
    if !(MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len()) {
        return Err(AuthError::InvalidCode(format!(
            "code must be {MIN_CODE_LEN} to {MAX_CODE_LEN} characters, got {}",
            code.len()
        )));
    }
    Ok(code)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Extract the access token from a token endpoint response body.
///
/// # Errors
///
/// Returns `AuthError::TokenMissingInResponse` if the body is not JSON or
/// has no non-empty `access_token`.
pub fn parse_token_response(body: &str) -> Result<Credential, AuthError> {
    let response: TokenResponse = serde_json::from_str(body)
        .map_err(|e| AuthError::TokenMissingInResponse(format!("unreadable response: {e}")))?;

    response
        .access_token
        .filter(|token| !token.trim().is_empty())
        .map(Credential)
        .ok_or_else(|| AuthError::TokenMissingInResponse("no access_token field".into()))
}

/// Client for the OAuth server.
pub struct OAuthClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl OAuthClient {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// URL the operator opens to grant access to the app folder.
    #[must_use]
    pub fn authorize_url(&self) -> String {
        authorize_url(&self.base_url, &self.client_id)
    }

    /// Exchange an authorization code for a credential.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCode` before any request is made if the code is
    /// malformed, `TokenRequestFailed` on transport failure or a non-success
    /// status, and `TokenMissingInResponse` if the body has no token.
    pub async fn exchange(&self, code: &str) -> Result<Credential, AuthError> {
        let code = validate_code(code)?;
        let url = format!("{}/token", self.base_url);
        debug!(%url, "requesting access token");

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::TokenRequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::TokenRequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(AuthError::TokenRequestFailed(format!("{status}: {body}")));
        }

        let credential = parse_token_response(&body)?;
        info!("obtained access token");
        Ok(credential)
    }
}

/// Build the authorize URL for `client_id` on the OAuth server at `base_url`.
#[must_use]
pub fn authorize_url(base_url: &str, client_id: &str) -> String {
    format!(
        "{}/authorize?response_type=code&client_id={client_id}&scope={APP_FOLDER_SCOPE}",
        base_url.trim_end_matches('/')
    )
}
