//! Signature verification strategies.
//!
//! The validator does not know how to turn an issuer DID into a public key. It delegates that and
//! the cryptographic check to a [`SignatureVerifier`].

use sonr_key::{JwsAlgName, JwsAlgorithm, Verify, WrappedPubKey};

use crate::{UcanResult, ValidationCode, ValidationError, ValidationResult};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Checks a token signature.
pub trait SignatureVerifier {
    /// Verifies that `signature` over `message` was made by `issuer` using `alg`.
    fn verify(
        &self,
        alg: JwsAlgorithm,
        issuer: &str,
        message: &[u8],
        signature: &[u8],
    ) -> ValidationResult;
}

/// Resolves a DID to the public key it controls.
pub trait DidResolver {
    /// Resolves `did` to a public key.
    fn resolve(&self, did: &str) -> UcanResult<WrappedPubKey>;
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A verifier with no key resolution wired in.
///
/// Every signature is reported as [`SignatureUnavailable`](ValidationCode::SignatureUnavailable).
/// It is what [`validate_token`](crate::validate_token) uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnwiredVerifier;

/// Resolves `did:key` identifiers by decoding the key embedded in them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DidKeyResolver;

/// A verifier that resolves the issuer's key with `R` and checks the signature with it.
///
/// `EdDSA` and `ES256` are supported. There is no `RS256` primitive so those signatures are
/// reported as unavailable.
#[derive(Debug, Clone, Default)]
pub struct ResolvingVerifier<R> {
    resolver: R,
}

/// A verifier for tokens issued by `did:key` identities.
pub type DidKeyVerifier = ResolvingVerifier<DidKeyResolver>;

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<R> ResolvingVerifier<R>
where
    R: DidResolver,
{
    /// Creates a verifier that resolves keys with `resolver`.
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }
}

impl DidKeyVerifier {
    /// Creates a `did:key` verifier.
    pub fn did_key() -> Self {
        Self::new(DidKeyResolver)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl SignatureVerifier for UnwiredVerifier {
    fn verify(&self, alg: JwsAlgorithm, issuer: &str, _: &[u8], _: &[u8]) -> ValidationResult {
        Err(ValidationError::new(
            ValidationCode::SignatureUnavailable,
            format!("no key resolver is configured to verify the {alg} signature of {issuer}"),
        ))
    }
}

impl<R> SignatureVerifier for ResolvingVerifier<R>
where
    R: DidResolver,
{
    fn verify(
        &self,
        alg: JwsAlgorithm,
        issuer: &str,
        message: &[u8],
        signature: &[u8],
    ) -> ValidationResult {
        if alg == JwsAlgorithm::RS256 {
            return Err(ValidationError::new(
                ValidationCode::SignatureUnavailable,
                "RS256 signatures cannot be verified",
            ));
        }

        let key = self.resolver.resolve(issuer).map_err(|e| {
            ValidationError::new(
                ValidationCode::SignatureUnavailable,
                format!("cannot resolve a key for {issuer}: {e}"),
            )
        })?;

        if key.alg() != alg {
            return Err(ValidationError::new(
                ValidationCode::InvalidSignature,
                format!(
                    "header algorithm {alg} does not match the {} key of {issuer}",
                    key.alg()
                ),
            ));
        }

        key.verify(message, signature).map_err(|e| {
            ValidationError::new(
                ValidationCode::InvalidSignature,
                format!("signature does not verify against {issuer}: {e}"),
            )
        })
    }
}

impl<F> SignatureVerifier for F
where
    F: Fn(JwsAlgorithm, &str, &[u8], &[u8]) -> ValidationResult,
{
    fn verify(
        &self,
        alg: JwsAlgorithm,
        issuer: &str,
        message: &[u8],
        signature: &[u8],
    ) -> ValidationResult {
        self(alg, issuer, message, signature)
    }
}

impl DidResolver for DidKeyResolver {
    fn resolve(&self, did: &str) -> UcanResult<WrappedPubKey> {
        Ok(WrappedPubKey::from_did_key(did)?)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use sonr_key::{
        DidKeyEncode, Ed25519KeyPair, GetPublicKey, KeyPairGenerate, P256KeyPair, Sign,
    };

    use super::*;

    #[test_log::test]
    fn test_unwired_verifier_is_unavailable() {
        let result = UnwiredVerifier.verify(JwsAlgorithm::EdDSA, "did:key:z6Mk", b"m", b"s");
        assert_eq!(
            result.map_err(|e| e.code()),
            Err(ValidationCode::SignatureUnavailable)
        );
    }

    #[test_log::test]
    fn test_did_key_verifier_ed25519() -> anyhow::Result<()> {
        let key = Ed25519KeyPair::generate(&mut rand::thread_rng())?;
        let did = key.public_key().to_did_key();
        let signature = key.sign(b"message")?;

        let verifier = DidKeyVerifier::did_key();
        verifier.verify(JwsAlgorithm::EdDSA, &did, b"message", &signature)?;

        let tampered = verifier.verify(JwsAlgorithm::EdDSA, &did, b"massage", &signature);
        assert_eq!(
            tampered.map_err(|e| e.code()),
            Err(ValidationCode::InvalidSignature)
        );

        let mismatched = verifier.verify(JwsAlgorithm::ES256, &did, b"message", &signature);
        assert_eq!(
            mismatched.map_err(|e| e.code()),
            Err(ValidationCode::InvalidSignature)
        );

        Ok(())
    }

    #[test_log::test]
    fn test_did_key_verifier_p256() -> anyhow::Result<()> {
        let key = P256KeyPair::generate(&mut rand::thread_rng())?;
        let did = key.public_key().to_did_key();
        let signature = key.sign(b"message")?;

        DidKeyVerifier::did_key().verify(JwsAlgorithm::ES256, &did, b"message", &signature)?;

        Ok(())
    }

    #[test_log::test]
    fn test_did_key_verifier_unavailable() {
        let verifier = DidKeyVerifier::did_key();

        let web = verifier.verify(JwsAlgorithm::EdDSA, "did:web:example.com", b"m", b"s");
        assert_eq!(
            web.map_err(|e| e.code()),
            Err(ValidationCode::SignatureUnavailable)
        );

        let rsa = verifier.verify(JwsAlgorithm::RS256, "did:key:z4MX", b"m", b"s");
        assert_eq!(
            rsa.map_err(|e| e.code()),
            Err(ValidationCode::SignatureUnavailable)
        );
    }

    #[test_log::test]
    fn test_closure_verifier() {
        let accept_all = |_: JwsAlgorithm, _: &str, _: &[u8], _: &[u8]| -> ValidationResult { Ok(()) };
        assert!(accept_all
            .verify(JwsAlgorithm::RS256, "did:key:any", b"m", b"s")
            .is_ok());
    }
}
