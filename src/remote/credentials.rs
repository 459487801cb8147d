//! Remote storage credentials
//!
//! The OAuth access token is handed in with every call; nothing is kept in
//! server-side session state.

use std::fmt;

use crate::error::RemoteError;

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
}

impl Credential {
    pub fn bearer(access_token: impl Into<String>) -> Result<Self, RemoteError> {
        let access_token = access_token.into().trim().to_string();
        if access_token.is_empty() || access_token.contains(['\r', '\n']) {
            return Err(RemoteError::Unauthenticated);
        }
        Ok(Self { access_token })
    }

    /// Parses an `Authorization: Bearer <token>` header value
    pub fn from_authorization(header: Option<&str>) -> Result<Self, RemoteError> {
        let value = header.ok_or(RemoteError::Unauthenticated)?.trim();
        let (scheme, token) = value.split_once(' ').ok_or(RemoteError::Unauthenticated)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(RemoteError::Unauthenticated);
        }
        Self::bearer(token)
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .finish()
    }
}
