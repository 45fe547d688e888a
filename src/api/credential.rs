//! Hosting credentials.
//!
//! The token is held in a `SecretString` and only exposed when a request is
//! built. `Debug` output is redacted.

use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;

/// Username and personal access token for the hosting API.
#[derive(Clone)]
pub struct HostingCredential {
    username: String,
    token: SecretString,
}

impl HostingCredential {
    /// Builds a credential, rejecting empty values before any request is made.
    pub fn new(username: impl Into<String>, token: SecretString) -> Result<Self, ApiError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(ApiError::MissingCredential {
                field: "username".to_string(),
                hint: "set GITNOOB_GITHUB_USER or `git config --global github.user <name>`"
                    .to_string(),
            });
        }
        if token.expose_secret().trim().is_empty() {
            return Err(ApiError::MissingCredential {
                field: "token".to_string(),
                hint: "set GITNOOB_GITHUB_TOKEN or `git config --global github.token <token>`"
                    .to_string(),
            });
        }
        Ok(Self { username, token })
    }

    /// Builds a credential from optional parts, as resolved from configuration.
    pub fn from_parts(username: Option<String>, token: Option<String>) -> Result<Self, ApiError> {
        Self::new(
            username.unwrap_or_default(),
            SecretString::from(token.unwrap_or_default()),
        )
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl std::fmt::Debug for HostingCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostingCredential")
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
