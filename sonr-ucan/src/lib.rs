//! # Sonr UCAN
//!
//! [UCAN][ucan] capability tokens: JWT-shaped tokens whose payload lists the capabilities an
//! issuer delegates to an audience.
//!
//! Tokens are created with [`UcanBuilder`] and read with [`parse_token`]. Both directions share the
//! same canonical JSON serializer, so formatting a parsed token reproduces it byte for byte and the
//! signing message is stable. [`validate_token_with`] checks a parsed token against
//! [`ValidationOptions`] and reports failures with a [`ValidationCode`].
//!
//! Signatures are checked by a [`SignatureVerifier`]. [`DidKeyVerifier`] handles `EdDSA` and
//! `ES256` tokens issued by `did:key` identities.
//!
//! [ucan]: https://github.com/ucan-wg/spec

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod builder;
mod canonical;
mod capability;
mod config;
mod default;
mod encoding;
mod error;
mod facts;
mod format;
mod header;
mod parse;
mod payload;
mod proofs;
mod schema;
mod signature;
mod time;
mod ucan;
mod validation;
mod verifier;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use builder::*;
pub use canonical::*;
pub use capability::*;
pub use config::*;
pub use default::*;
pub use encoding::*;
pub use error::*;
pub use facts::*;
pub use format::*;
pub use header::*;
pub use parse::*;
pub use payload::*;
pub use proofs::*;
pub use schema::*;
pub use signature::*;
pub use ucan::*;
pub use validation::*;
pub use verifier::*;
