use serde::{Deserialize, Serialize};

use crate::{Ed25519PubKey, JwsAlgName, JwsAlgorithm, KeyResult, P256PubKey, Verify};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A key pair with a public and private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsymmetricKey<P, S> {
    pub(crate) public: P,
    pub(crate) private: S,
}

/// A public key.
pub type PubKey<P> = AsymmetricKey<P, ()>;

/// Supported key types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// An `ed25519` key
    #[serde(rename = "ed25519")]
    Ed25519,

    /// A `NIST P-256` key
    #[serde(rename = "p256")]
    P256,
}

/// A public key of any of the supported key types.
///
/// This is what a `did:key` identifier resolves to when the key type is not known upfront.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrappedPubKey {
    /// `ed25519` public key.
    Ed25519(Ed25519PubKey),

    /// `NIST P-256` public key.
    P256(P256PubKey),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl KeyType {
    /// Returns the JWS algorithm that signs with this key type.
    pub fn alg(&self) -> JwsAlgorithm {
        match self {
            KeyType::Ed25519 => JwsAlgorithm::EdDSA,
            KeyType::P256 => JwsAlgorithm::ES256,
        }
    }
}

impl WrappedPubKey {
    /// Returns the type of the wrapped key.
    pub fn key_type(&self) -> KeyType {
        match self {
            WrappedPubKey::Ed25519(_) => KeyType::Ed25519,
            WrappedPubKey::P256(_) => KeyType::P256,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Verify for WrappedPubKey {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        match self {
            WrappedPubKey::Ed25519(key) => key.verify(data, signature),
            WrappedPubKey::P256(key) => key.verify(data, signature),
        }
    }
}

impl JwsAlgName for WrappedPubKey {
    fn alg(&self) -> JwsAlgorithm {
        self.key_type().alg()
    }
}

impl From<Ed25519PubKey> for WrappedPubKey {
    fn from(pub_key: Ed25519PubKey) -> Self {
        WrappedPubKey::Ed25519(pub_key)
    }
}

impl From<P256PubKey> for WrappedPubKey {
    fn from(pub_key: P256PubKey) -> Self {
        WrappedPubKey::P256(pub_key)
    }
}
