use rand::RngCore;
use serde_json::Value;
use sonr_key::{JwsAlgName, JwsAlgorithm, Sign};

use crate::{
    capability_violations, encode_bytes, format_token, is_safe_timestamp, is_valid_did,
    signing_message, time, Capability, Ucan, UcanError, UcanFact, UcanHeader, UcanPayload,
    UcanResult, DEFAULT_ALGORITHM, DEFAULT_VERSION, MAX_SAFE_INTEGER, MIN_SAFE_INTEGER,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The number of random bytes in a nonce from [`UcanBuilder::random_nonce`].
pub const NONCE_LENGTH: usize = 32;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A builder for creating UCAN (User-Controlled Authorization Network) tokens.
///
/// Every setter checks its argument straight away and returns an error if it is invalid. Checks
/// that involve more than one field happen when the token is built, and all of their violations
/// are reported together.
///
/// ```
/// use sonr_ucan::{Capability, UcanBuilder};
///
/// # fn main() -> sonr_ucan::UcanResult<()> {
/// let token = UcanBuilder::default()
///     .issuer("did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK")?
///     .audience("did:web:example.com")?
///     .expiration(None)?
///     .add_capability(Capability::new("storage://photos", "crud/read"))?
///     .build(&[1, 2, 3, 4, 5])?;
///
/// assert_eq!(token.split('.').count(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct UcanBuilder {
    algorithm: JwsAlgorithm,
    version: String,
    issuer: Option<String>,
    audience: Option<String>,
    /// `Some(None)` is an explicit non-expiring token, `None` is unset.
    expiration: Option<Option<i64>>,
    not_before: Option<i64>,
    nonce: Option<String>,
    facts: Vec<UcanFact>,
    proofs: Vec<String>,
    capabilities: Vec<Capability>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl UcanBuilder {
    /// Sets the signing algorithm named in the header.
    pub fn algorithm(self, algorithm: JwsAlgorithm) -> Self {
        Self { algorithm, ..self }
    }

    /// Sets the UCAN spec version named in the header.
    pub fn version(self, version: impl Into<String>) -> UcanResult<Self> {
        let version = version.into();
        if version.is_empty() {
            return Err(UcanError::InvalidArgument(
                "version must be a non-empty string".to_string(),
            ));
        }

        Ok(Self { version, ..self })
    }

    /// Sets the issuer DID.
    pub fn issuer(self, issuer: impl Into<String>) -> UcanResult<Self> {
        let issuer = check_did(issuer.into(), "issuer")?;
        Ok(Self {
            issuer: Some(issuer),
            ..self
        })
    }

    /// Sets the audience DID.
    pub fn audience(self, audience: impl Into<String>) -> UcanResult<Self> {
        let audience = check_did(audience.into(), "audience")?;
        Ok(Self {
            audience: Some(audience),
            ..self
        })
    }

    /// Sets the expiration time in Unix seconds. `None` makes a token that never expires.
    ///
    /// The expiration must be set, even if only to `None`, before the token can be built.
    pub fn expiration(self, expiration: Option<i64>) -> UcanResult<Self> {
        if let Some(exp) = expiration {
            check_timestamp(exp, "expiration")?;
        }

        Ok(Self {
            expiration: Some(expiration),
            ..self
        })
    }

    /// Sets the expiration to `seconds` from now. Fractions of a second are dropped.
    pub fn expires_in(self, seconds: f64) -> UcanResult<Self> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(UcanError::InvalidArgument(format!(
                "expires_in must be a finite positive number of seconds, got {seconds}"
            )));
        }

        let expiration = time::now()
            .checked_add(seconds.floor() as i64)
            .ok_or_else(|| {
                UcanError::InvalidArgument(format!("expires_in of {seconds}s overflows"))
            })?;

        self.expiration(Some(expiration))
    }

    /// Sets the time in Unix seconds before which the token is not valid.
    pub fn not_before(self, not_before: i64) -> UcanResult<Self> {
        check_timestamp(not_before, "not_before")?;
        Ok(Self {
            not_before: Some(not_before),
            ..self
        })
    }

    /// Sets the nonce.
    pub fn nonce(self, nonce: impl Into<String>) -> UcanResult<Self> {
        let nonce = nonce.into();
        if nonce.is_empty() {
            return Err(UcanError::InvalidArgument(
                "nonce must be a non-empty string".to_string(),
            ));
        }

        Ok(Self {
            nonce: Some(nonce),
            ..self
        })
    }

    /// Sets a nonce of [`NONCE_LENGTH`] random bytes, base64url encoded.
    pub fn random_nonce(self) -> Self {
        let mut bytes = [0u8; NONCE_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self {
            nonce: Some(encode_bytes(bytes)),
            ..self
        }
    }

    /// Adds a capability.
    pub fn add_capability(mut self, capability: Capability) -> UcanResult<Self> {
        let violations =
            capability_violations(&serde_json::to_value(&capability)?, self.capabilities.len());
        if !violations.is_empty() {
            return Err(UcanError::InvalidArgument(violations.join("; ")));
        }

        self.capabilities.push(capability);
        Ok(self)
    }

    /// Adds several capabilities.
    pub fn add_capabilities(
        self,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> UcanResult<Self> {
        capabilities
            .into_iter()
            .try_fold(self, |builder, capability| builder.add_capability(capability))
    }

    /// Adds a fact. The fact must be a JSON object.
    pub fn add_fact(mut self, fact: Value) -> UcanResult<Self> {
        match fact {
            Value::Object(fact) => {
                self.facts.push(fact);
                Ok(self)
            }
            other => Err(UcanError::InvalidArgument(format!(
                "fact must be a JSON object, got {other}"
            ))),
        }
    }

    /// Adds a serialized proof token.
    ///
    /// The proof is not parsed here. See [`validate_proof_chain`](crate::validate_proof_chain).
    pub fn add_proof(mut self, proof: impl Into<String>) -> UcanResult<Self> {
        let proof = proof.into();
        if proof.is_empty() {
            return Err(UcanError::InvalidArgument(
                "proof must be a non-empty string".to_string(),
            ));
        }

        self.proofs.push(proof);
        Ok(self)
    }

    /// Adds `parent` as a proof, delegating from its authority.
    pub fn delegating_from(self, parent: &Ucan) -> UcanResult<Self> {
        self.add_proof(parent.encode()?)
    }

    /// Returns the exact message that must be signed to build this token.
    pub fn signing_message(&self) -> UcanResult<String> {
        let (header, payload) = self.assemble()?;
        signing_message(&header, &payload)
    }

    /// Builds the token with a signature produced elsewhere.
    pub fn build_token(self, signature: &[u8]) -> UcanResult<Ucan> {
        let (header, payload) = self.assemble()?;

        if signature.is_empty() {
            return Err(UcanError::InvalidArgument(
                "signature must be non-empty".to_string(),
            ));
        }

        tracing::debug!(issuer = payload.issuer(), alg = %header.alg(), "built ucan");

        Ok(Ucan::from_parts(header, payload, signature))
    }

    /// Builds the token with a signature produced elsewhere and serializes it.
    pub fn build(self, signature: &[u8]) -> UcanResult<String> {
        format_token(&self.build_token(signature)?)
    }

    /// Signs the token with `key` and serializes it.
    ///
    /// The header algorithm is taken from the key.
    pub fn sign<K>(self, key: &K) -> UcanResult<String>
    where
        K: Sign + JwsAlgName,
    {
        let builder = self.algorithm(key.alg());
        let signature = key.sign(builder.signing_message()?.as_bytes())?;
        builder.build(&signature)
    }

    fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.issuer.is_none() {
            violations.push("issuer is required".to_string());
        }

        if self.audience.is_none() {
            violations.push("audience is required".to_string());
        }

        if self.expiration.is_none() {
            violations.push(
                "expiration is required (use None for a token that never expires)".to_string(),
            );
        }

        if self.capabilities.is_empty() {
            violations.push("at least one capability is required".to_string());
        }

        if let (Some(nbf), Some(Some(exp))) = (self.not_before, self.expiration) {
            if nbf >= exp {
                violations.push(format!(
                    "not_before ({nbf}) must be earlier than expiration ({exp})"
                ));
            }
        }

        violations
    }

    fn assemble(&self) -> UcanResult<(UcanHeader, UcanPayload)> {
        let violations = self.violations();
        let (Some(issuer), Some(audience), Some(expiration), true) = (
            &self.issuer,
            &self.audience,
            self.expiration,
            violations.is_empty(),
        ) else {
            return Err(UcanError::Incomplete(violations));
        };

        let header = UcanHeader::new(self.algorithm, self.version.clone());
        let payload = UcanPayload {
            issuer: issuer.clone(),
            audience: audience.clone(),
            expiration,
            not_before: self.not_before,
            nonce: self.nonce.clone(),
            facts: (!self.facts.is_empty()).then(|| self.facts.clone()),
            proofs: (!self.proofs.is_empty()).then(|| self.proofs.clone()),
            capabilities: self.capabilities.clone(),
            extra: Default::default(),
        };

        Ok((header, payload))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn check_did(did: String, role: &str) -> UcanResult<String> {
    if !is_valid_did(&did) {
        return Err(UcanError::InvalidArgument(format!(
            "{role} must be a DID, got {did:?}"
        )));
    }

    Ok(did)
}

fn check_timestamp(timestamp: i64, field: &str) -> UcanResult<()> {
    if !is_safe_timestamp(timestamp) {
        return Err(UcanError::InvalidArgument(format!(
            "{field} must be between {MIN_SAFE_INTEGER} and {MAX_SAFE_INTEGER}, got {timestamp}"
        )));
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for UcanBuilder {
    fn default() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM,
            version: DEFAULT_VERSION.to_string(),
            issuer: None,
            audience: None,
            expiration: None,
            not_before: None,
            nonce: None,
            facts: Vec::new(),
            proofs: Vec::new(),
            capabilities: Vec::new(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
