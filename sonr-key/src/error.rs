//! Error types of the sonr-key crate.

use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A type alias for a `Result` that uses `KeyError` as the error type.
pub type KeyResult<T> = Result<T, KeyError>;

/// The main error type of the sonr-key crate.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The JWS algorithm name is not one of the supported algorithms.
    #[error("Unsupported JWS algorithm: {0}")]
    UnsupportedJwsAlgorithm(String),

    /// Signature creation, parsing or verification failed.
    #[error("Signature error: {0}")]
    SignatureError(#[from] ed25519_dalek::SignatureError),

    /// The string is not a `did:key` identifier.
    #[error("Expected a `did:key` identifier: {0}")]
    InvalidDidKey(String),

    /// `did:key` identifiers must use the base58btc multibase encoding.
    #[error("Expected a base58btc encoded `did:key`, got {0:?}")]
    UnexpectedBase(multibase::Base),

    /// The multicodec prefix names a key type that has no implementation here.
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// The multicodec prefix is not recognized.
    #[error("Unrecognized multicodec prefix: {0:?}")]
    UnrecognizedCodec(Vec<u8>),

    /// Multibase decoding error.
    #[error("Multibase error: {0}")]
    MultibaseError(#[from] multibase::Error),
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `KeyResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> KeyResult<T> {
    Result::Ok(value)
}
