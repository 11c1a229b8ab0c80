//! Google sign-in: ID token verification against Google's tokeninfo endpoint.

use async_trait::async_trait;
use serde::Deserialize;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

#[derive(Debug)]
pub enum GoogleAuthError {
    /// No client id configured.
    NotConfigured,
    /// Google rejected the token or it was issued for another client.
    InvalidToken(String),
    /// Google could not be reached.
    Http(reqwest::Error),
}

impl std::fmt::Display for GoogleAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoogleAuthError::NotConfigured => write!(f, "Google sign-in is not configured"),
            GoogleAuthError::InvalidToken(msg) => write!(f, "Invalid Google token: {}", msg),
            GoogleAuthError::Http(e) => write!(f, "Google token verification failed: {}", e),
        }
    }
}

impl std::error::Error for GoogleAuthError {}

impl From<reqwest::Error> for GoogleAuthError {
    fn from(e: reqwest::Error) -> Self {
        GoogleAuthError::Http(e)
    }
}

/// Identity asserted by a verified ID token.
#[derive(Clone, Debug, PartialEq)]
pub struct GoogleIdentity {
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, GoogleAuthError>;
}

#[derive(Deserialize)]
struct TokenInfo {
    aud: Option<String>,
    iss: Option<String>,
    email: Option<String>,
    /// Google sends this as the string "true" or "false".
    email_verified: Option<serde_json::Value>,
    name: Option<String>,
}

impl TokenInfo {
    fn into_identity(self, client_id: &str) -> Result<GoogleIdentity, GoogleAuthError> {
        if self.aud.as_deref() != Some(client_id) {
            return Err(GoogleAuthError::InvalidToken("audience mismatch".into()));
        }

        match self.iss.as_deref() {
            Some(iss) if GOOGLE_ISSUERS.contains(&iss) => {}
            _ => return Err(GoogleAuthError::InvalidToken("unexpected issuer".into())),
        }

        let verified = match &self.email_verified {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        };
        if !verified {
            return Err(GoogleAuthError::InvalidToken("email not verified".into()));
        }

        let email = self
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| GoogleAuthError::InvalidToken("no email claim".into()))?;

        Ok(GoogleIdentity {
            email,
            name: self.name,
        })
    }
}

/// Verifies tokens by asking Google directly.
pub struct GoogleTokenInfo {
    client: reqwest::Client,
    client_id: String,
}

impl GoogleTokenInfo {
    pub fn new(client_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
        }
    }
}

#[async_trait]
impl IdTokenVerifier for GoogleTokenInfo {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, GoogleAuthError> {
        if self.client_id.is_empty() {
            return Err(GoogleAuthError::NotConfigured);
        }

        let response = self
            .client
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleAuthError::InvalidToken(format!(
                "tokeninfo returned {}",
                response.status()
            )));
        }

        let info: TokenInfo = response.json().await?;
        info.into_identity(&self.client_id)
    }
}
