//! Random identities for every record in a bundle.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Prefix of every internal reference inside a document bundle.
pub const URN_UUID_PREFIX: &str = "urn:uuid:";

/// Opaque record identity rendered as a hyphenated lowercase UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully-qualified internal reference, `urn:uuid:<token>`.
    pub fn urn(&self) -> String {
        format!("{URN_UUID_PREFIX}{}", self.0)
    }
}

impl From<Uuid> for Token {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh identities; every call must return a new token.
pub trait IdSource {
    fn next_id(&mut self) -> Token;
}

/// UUID v4 identities.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> Token {
        Token::from(Uuid::new_v4())
    }
}
