use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand_core::CryptoRngCore;

use crate::{
    AsymmetricKey, GetPublicKey, JwsAlgName, JwsAlgorithm, KeyPairGenerate, KeyResult,
    PubKey, PublicKeyBytes, PublicKeyGenerate, Sign, Verify,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An [`ed25519`][ref] verifying key.
///
/// [ref]: https://en.wikipedia.org/wiki/EdDSA
pub type Ed25519PubKey = PubKey<VerifyingKey>;

/// An [`ed25519`][ref] key pair with a signing key.
///
/// [ref]: https://en.wikipedia.org/wiki/EdDSA
pub type Ed25519KeyPair = Ed25519Key<SigningKey>;

pub(crate) type Ed25519Key<S> = AsymmetricKey<VerifyingKey, S>;

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<S> Verify for Ed25519Key<S> {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        self.public
            .verify_strict(data, &Signature::try_from(signature)?)
            .map_err(Into::into)
    }
}

impl Sign for Ed25519KeyPair {
    fn sign(&self, data: &[u8]) -> KeyResult<Vec<u8>> {
        let signature = self.private.try_sign(data)?;
        Ok(signature.to_bytes().to_vec())
    }
}

impl PublicKeyGenerate for Ed25519PubKey {
    fn from_public_key(bytes: &[u8]) -> KeyResult<Self> {
        Ok(Self {
            public: VerifyingKey::try_from(bytes)?,
            private: (),
        })
    }
}

impl KeyPairGenerate for Ed25519KeyPair {
    fn generate(rng: &mut impl CryptoRngCore) -> KeyResult<Self> {
        let signing_key = SigningKey::generate(rng);
        Ok(Self {
            public: signing_key.verifying_key(),
            private: signing_key,
        })
    }
}

impl<S> GetPublicKey for Ed25519Key<S> {
    type PublicKey = Ed25519PubKey;

    fn public_key(&self) -> Self::PublicKey {
        Ed25519PubKey {
            public: self.public,
            private: (),
        }
    }
}

impl<S> PublicKeyBytes for Ed25519Key<S> {
    fn public_key_bytes(&self) -> Vec<u8> {
        self.public.to_bytes().to_vec()
    }
}

impl<S> JwsAlgName for Ed25519Key<S> {
    fn alg(&self) -> JwsAlgorithm {
        JwsAlgorithm::EdDSA
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
