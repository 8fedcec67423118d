//! Encoding and decoding of public keys as [`did:key`][did-key] identifiers.
//!
//! A `did:key` identifier is the public key bytes prefixed with their [multicodec][multicodec]
//! code and then encoded with base58btc [multibase][multibase] (the leading `z`).
//!
//! [did-key]: https://w3c-ccg.github.io/did-method-key/
//! [multicodec]: https://github.com/multiformats/multicodec
//! [multibase]: https://github.com/multiformats/multibase

use multibase::Base;

use crate::{
    AsymmetricKey, Ed25519PubKey, KeyError, KeyResult, P256PubKey, PublicKeyBytes,
    PublicKeyGenerate, WrappedPubKey,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The prefix shared by every `did:key` identifier.
pub const DID_KEY_PREFIX: &str = "did:key:";

/// `ed25519-pub` multicodec code as a varint.
pub const ED25519_PUB_KEY_CODE: [u8; 2] = [0xED, 0x01];

/// `p256-pub` multicodec code as a varint.
pub const P256_PUB_KEY_CODE: [u8; 2] = [0x80, 0x24];

/// `rsa-pub` multicodec code as a varint.
pub const RSA_PUB_KEY_CODE: [u8; 2] = [0x85, 0x24];

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// A trait for public keys that can be expressed as a `did:key` identifier.
pub trait DidKeyEncode {
    /// Returns the `did:key` identifier of the public key.
    fn to_did_key(&self) -> String;
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl WrappedPubKey {
    /// Decodes a `did:key` identifier into the public key it names.
    pub fn from_did_key(did: impl AsRef<str>) -> KeyResult<Self> {
        let did = did.as_ref();
        let encoded = did
            .strip_prefix(DID_KEY_PREFIX)
            .ok_or_else(|| KeyError::InvalidDidKey(did.to_string()))?;

        let (base, multicodec_enc) = multibase::decode(encoded)?;
        if base != Base::Base58Btc {
            return Err(KeyError::UnexpectedBase(base));
        }

        if multicodec_enc.len() < 2 {
            return Err(KeyError::InvalidDidKey(did.to_string()));
        }

        let (code, pk_bytes) = multicodec_enc.split_at(2);
        let key = match code {
            [0xED, 0x01] => WrappedPubKey::Ed25519(Ed25519PubKey::from_public_key(pk_bytes)?),
            [0x80, 0x24] => WrappedPubKey::P256(P256PubKey::from_public_key(pk_bytes)?),
            [0x85, 0x24] => return Err(KeyError::UnsupportedKeyType("rsa".to_string())),
            _ => return Err(KeyError::UnrecognizedCodec(code.to_vec())),
        };

        tracing::trace!(did, key_type = ?key.key_type(), "decoded did:key");

        Ok(key)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn encode_did_key(code: [u8; 2], public_key: &[u8]) -> String {
    let mut multicodec_enc = code.to_vec();
    multicodec_enc.extend_from_slice(public_key);
    format!(
        "{DID_KEY_PREFIX}{}",
        multibase::encode(Base::Base58Btc, multicodec_enc)
    )
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<S> DidKeyEncode for AsymmetricKey<ed25519_dalek::VerifyingKey, S> {
    fn to_did_key(&self) -> String {
        encode_did_key(ED25519_PUB_KEY_CODE, &self.public_key_bytes())
    }
}

impl<S> DidKeyEncode for AsymmetricKey<p256::ecdsa::VerifyingKey, S> {
    fn to_did_key(&self) -> String {
        encode_did_key(P256_PUB_KEY_CODE, &self.public_key_bytes())
    }
}

impl DidKeyEncode for WrappedPubKey {
    fn to_did_key(&self) -> String {
        match self {
            WrappedPubKey::Ed25519(key) => key.to_did_key(),
            WrappedPubKey::P256(key) => key.to_did_key(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
