use p256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use rand_core::CryptoRngCore;

use crate::{
    AsymmetricKey, GetPublicKey, JwsAlgName, JwsAlgorithm, KeyPairGenerate, KeyResult,
    PubKey, PublicKeyBytes, PublicKeyGenerate, Sign, Verify,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A [`NIST P-256`][ref] public key.
///
/// [ref]: https://en.wikipedia.org/wiki/Elliptic_Curve_Digital_Signature_Algorithm
pub type P256PubKey = PubKey<VerifyingKey>;

/// A [`NIST P-256`][ref] key pair with a signing key.
///
/// [ref]: https://en.wikipedia.org/wiki/Elliptic_Curve_Digital_Signature_Algorithm
pub type P256KeyPair = P256Key<SigningKey>;

pub(crate) type P256Key<S> = AsymmetricKey<VerifyingKey, S>;

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<S> Verify for P256Key<S> {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        self.public
            .verify(data, &Signature::try_from(signature)?)
            .map_err(Into::into)
    }
}

impl Sign for P256KeyPair {
    fn sign(&self, data: &[u8]) -> KeyResult<Vec<u8>> {
        let signature: Signature = self.private.try_sign(data)?;
        Ok(signature.to_vec())
    }
}

impl PublicKeyGenerate for P256PubKey {
    /// Generates a public key from the given bytes from the [`Elliptic-Curve-Point-to-Octet-String` encoding][ref]
    /// described in SEC 1: Elliptic Curve Cryptography (Version 2.0).
    ///
    /// [ref]: http://www.secg.org/sec1-v2.pdf
    fn from_public_key(bytes: &[u8]) -> KeyResult<Self> {
        Ok(Self {
            public: VerifyingKey::from_sec1_bytes(bytes)?,
            private: (),
        })
    }
}

impl KeyPairGenerate for P256KeyPair {
    fn generate(rng: &mut impl CryptoRngCore) -> KeyResult<Self> {
        let signing_key = SigningKey::random(rng);
        Ok(Self {
            public: *signing_key.verifying_key(),
            private: signing_key,
        })
    }
}

impl<S> GetPublicKey for P256Key<S> {
    type PublicKey = P256PubKey;

    fn public_key(&self) -> Self::PublicKey {
        P256PubKey {
            public: self.public,
            private: (),
        }
    }
}

impl<S> PublicKeyBytes for P256Key<S> {
    /// Returns the compressed public key bytes in the [`Elliptic-Curve-Point-to-Octet-String` encoding][ref]
    /// described in SEC 1: Elliptic Curve Cryptography (Version 2.0).
    ///
    /// [ref]: http://www.secg.org/sec1-v2.pdf
    fn public_key_bytes(&self) -> Vec<u8> {
        self.public.to_encoded_point(true).as_bytes().to_vec()
    }
}

impl<S> JwsAlgName for P256Key<S> {
    fn alg(&self) -> JwsAlgorithm {
        JwsAlgorithm::ES256
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p256_generate() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = P256KeyPair::generate(&mut rng)?;

        let public_key_bytes = key_pair.public_key_bytes();
        assert_eq!(public_key_bytes.len(), 33);

        let public_key = P256PubKey::from_public_key(&public_key_bytes)?;
        assert_eq!(public_key, key_pair.public_key());
        assert!(P256PubKey::from_public_key(&public_key_bytes[1..]).is_err());

        Ok(())
    }

    #[test]
    fn test_p256_sign_and_verify() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = P256KeyPair::generate(&mut rng)?;

        let data = b"eyJhbGciOiJFUzI1NiJ9.eyJpc3MiOiJkaWQ6a2V5OmFiYyJ9";
        let signature = key_pair.sign(data)?;

        key_pair.verify(data, &signature)?;
        key_pair.public_key().verify(data, &signature)?;

        assert!(key_pair.verify(b"tampered", &signature).is_err());

        Ok(())
    }
}
