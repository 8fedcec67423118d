//! # Sonr Key
//!
//! Key material used to sign and verify UCAN tokens.
//!
//! This crate currently only supports the following key types:
//! - `ed25519` (`EdDSA`)
//! - `NIST P-256` (`ES256`)
//!
//! Public keys can be encoded as and decoded from [`did:key`][did-key] identifiers.
//!
//! [did-key]: https://w3c-ccg.github.io/did-method-key/

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod did_key;
mod ed25519;
mod error;
mod jws;
mod key;
mod nist_p256;
mod traits;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use did_key::*;
pub use ed25519::*;
pub use error::*;
pub use jws::*;
pub use key::*;
pub use nist_p256::*;
pub use traits::*;
