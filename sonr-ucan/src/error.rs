//! Error types of the sonr-ucan crate.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result type for UCAN operations.
pub type UcanResult<T> = Result<T, UcanError>;

/// Defines the types of errors that can occur in UCAN operations.
#[derive(Debug, Error)]
pub enum UcanError {
    /// The token string is structurally malformed: wrong segment count, empty segment or bad signature segment.
    #[error("Invalid token format: {0}")]
    Format(String),

    /// A segment is not valid base64url, not UTF-8 or not JSON.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A segment decoded to JSON that does not have the expected shape.
    ///
    /// Every violated field is listed, not just the first one found.
    #[error("Invalid {part}: {}", .violations.join("; "))]
    Schema {
        /// The part of the token that failed.
        part: TokenPart,

        /// Every violation found in the part.
        violations: Vec<String>,
    },

    /// A well-formed token failed a semantic rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A builder setter rejected its argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The builder is missing required fields or has inconsistent ones.
    #[error("Cannot build UCAN: {}", .0.join("; "))]
    Incomplete(Vec<String>),

    /// Json (de)serialization errors
    #[error("Json serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Key errors
    #[error("Key error: {0}")]
    KeyError(#[from] sonr_key::KeyError),

    /// Io error.
    #[error("Io error: {0}")]
    IoError(#[from] std::io::Error),

    /// Toml deserialization error.
    #[error("Toml deserialization error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// The three dot-separated parts of a serialized token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPart {
    /// The header segment.
    Header,

    /// The payload segment.
    Payload,

    /// The signature segment.
    Signature,
}

/// A semantic validation failure.
///
/// The [`code`](ValidationError::code) is meant for programs, the message for people.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ValidationError {
    code: ValidationCode,
    message: String,
}

/// Machine-inspectable reason for a failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    /// The header algorithm is not accepted.
    UnsupportedAlgorithm,

    /// The issuer is not a DID.
    InvalidIssuer,

    /// The audience is not a DID.
    InvalidAudience,

    /// The token is past its expiration.
    Expired,

    /// The token is before its not-before time.
    NotYetValid,

    /// A capability is malformed.
    InvalidCapability,

    /// A capability is broader than what its proofs delegate.
    AttenuationFailed,

    /// The signature does not verify.
    InvalidSignature,

    /// No key resolution or verification primitive is available for the token.
    SignatureUnavailable,

    /// A proof cannot be parsed.
    InvalidProof,

    /// A proof does not link to the token it supports.
    ProofChainBroken,

    /// The delegation chain is deeper than allowed.
    ProofDepthExceeded,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Returns the failure code.
    pub fn code(&self) -> ValidationCode {
        self.code
    }

    /// Returns the human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns a copy of this error with `context` prepended to the message.
    pub fn context(self, context: impl Display) -> Self {
        Self {
            code: self.code,
            message: format!("{context}: {}", self.message),
        }
    }
}

impl ValidationCode {
    /// Returns the code as it appears on the wire, e.g. `NOT_YET_VALID`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::UnsupportedAlgorithm => "UNSUPPORTED_ALGORITHM",
            ValidationCode::InvalidIssuer => "INVALID_ISSUER",
            ValidationCode::InvalidAudience => "INVALID_AUDIENCE",
            ValidationCode::Expired => "EXPIRED",
            ValidationCode::NotYetValid => "NOT_YET_VALID",
            ValidationCode::InvalidCapability => "INVALID_CAPABILITY",
            ValidationCode::AttenuationFailed => "ATTENUATION_FAILED",
            ValidationCode::InvalidSignature => "INVALID_SIGNATURE",
            ValidationCode::SignatureUnavailable => "SIGNATURE_UNAVAILABLE",
            ValidationCode::InvalidProof => "INVALID_PROOF",
            ValidationCode::ProofChainBroken => "PROOF_CHAIN_BROKEN",
            ValidationCode::ProofDepthExceeded => "PROOF_DEPTH_EXCEEDED",
        }
    }
}

impl UcanError {
    /// Returns the validation code if this is a validation failure.
    pub fn validation_code(&self) -> Option<ValidationCode> {
        match self {
            UcanError::Validation(error) => Some(error.code()),
            _ => None,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for TokenPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenPart::Header => write!(f, "header"),
            TokenPart::Payload => write!(f, "payload"),
            TokenPart::Signature => write!(f, "signature"),
        }
    }
}

impl Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
