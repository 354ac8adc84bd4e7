//! Credential token validation.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Reasons a credential is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is empty")]
    Empty,
    #[error("token {0:?} is not a valid UUID")]
    Malformed(String),
}

/// A credential whose syntax has been checked.
///
/// The original string is kept verbatim because it is written to the wire
/// as the prefix of every frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Accept `raw` if it parses as a UUID.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        if raw.is_empty() {
            return Err(TokenError::Empty);
        }
        Uuid::try_parse(raw).map_err(|_| TokenError::Malformed(raw.to_owned()))?;
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep credentials out of debug output.
        let tail = self.0.get(self.0.len().saturating_sub(4)..).unwrap_or("");
        write!(f, "Token(****{tail})")
    }
}
