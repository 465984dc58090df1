//! Identity table errors - raised while building the known-identity table at startup

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Errors building the known-identity table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Aliases per identity must be at least 1")]
    ZeroAliasCount,

    #[error("Identifier table has {identities} identities but only {hues} hues")]
    HueCountMismatch { identities: usize, hues: usize },

    #[error("Identifier {0} appears in more than one identity")]
    DuplicateIdentifier(Snowflake),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid hue: {0}")]
    InvalidHue(String),
}

impl IdentityError {
    /// Get an error code string for operator-facing reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZeroAliasCount => "ZERO_ALIAS_COUNT",
            Self::HueCountMismatch { .. } => "HUE_COUNT_MISMATCH",
            Self::DuplicateIdentifier(_) => "DUPLICATE_IDENTIFIER",
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            Self::InvalidHue(_) => "INVALID_HUE",
        }
    }
}
