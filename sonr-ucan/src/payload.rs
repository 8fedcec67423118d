use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{format_payload, parse_payload_segment, Capability, UcanError, UcanFact};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Represents the payload part of a UCAN token, which contains all the claims and data necessary
/// for the authorization process.
///
/// `exp` is always serialized, as `null` when the token never expires. The other optional claims
/// are omitted when unset. Claims this type does not know about are kept as they were decoded so
/// that re-formatting a parsed payload reproduces it.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct UcanPayload {
    /// The DID of the issuer who issued the UCAN.
    #[serde(rename = "iss")]
    pub(crate) issuer: String,

    /// The DID of the audience, which is typically the recipient or verifier of the UCAN.
    #[serde(rename = "aud")]
    pub(crate) audience: String,

    /// The expiration time of the UCAN in Unix seconds. `None` means it never expires.
    #[serde(rename = "exp")]
    pub(crate) expiration: Option<i64>,

    /// The time in Unix seconds before which the UCAN should not be considered valid.
    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub(crate) not_before: Option<i64>,

    /// A nonce used to ensure the uniqueness and to prevent replay attacks.
    #[serde(rename = "nnc", default, skip_serializing_if = "Option::is_none")]
    pub(crate) nonce: Option<String>,

    /// Additional facts or claims included in the UCAN.
    #[serde(rename = "fct", default, skip_serializing_if = "Option::is_none")]
    pub(crate) facts: Option<Vec<UcanFact>>,

    /// Serialized parent tokens this UCAN's authority is delegated from.
    #[serde(rename = "prf", default, skip_serializing_if = "Option::is_none")]
    pub(crate) proofs: Option<Vec<String>>,

    /// The capabilities or permissions granted by the UCAN.
    #[serde(rename = "att")]
    pub(crate) capabilities: Vec<Capability>,

    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl UcanPayload {
    /// Creates a payload with the required claims.
    ///
    /// The payload is not checked. Use [`UcanBuilder`](crate::UcanBuilder) to construct a payload
    /// that is guaranteed to be valid.
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        expiration: Option<i64>,
        capabilities: Vec<Capability>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            expiration,
            not_before: None,
            nonce: None,
            facts: None,
            proofs: None,
            capabilities,
            extra: Map::new(),
        }
    }

    /// Returns the payload with the not-before time set.
    pub fn with_not_before(self, not_before: i64) -> Self {
        Self {
            not_before: Some(not_before),
            ..self
        }
    }

    /// Returns the payload with the nonce set.
    pub fn with_nonce(self, nonce: impl Into<String>) -> Self {
        Self {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// Returns the payload with the facts set.
    pub fn with_facts(self, facts: Vec<UcanFact>) -> Self {
        Self {
            facts: Some(facts),
            ..self
        }
    }

    /// Returns the payload with the proofs set.
    pub fn with_proofs(self, proofs: Vec<String>) -> Self {
        Self {
            proofs: Some(proofs),
            ..self
        }
    }

    /// Returns the issuer DID.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the audience DID.
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Returns the expiration time. `None` means the token never expires.
    pub fn expiration(&self) -> Option<i64> {
        self.expiration
    }

    /// Returns the not-before time.
    pub fn not_before(&self) -> Option<i64> {
        self.not_before
    }

    /// Returns the nonce.
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    /// Returns the facts.
    pub fn facts(&self) -> &[UcanFact] {
        self.facts.as_deref().unwrap_or_default()
    }

    /// Returns the serialized proof tokens.
    pub fn proofs(&self) -> &[String] {
        self.proofs.as_deref().unwrap_or_default()
    }

    /// Returns the capabilities.
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Returns the claims this type has no field for.
    pub fn extra_claims(&self) -> &Map<String, Value> {
        &self.extra
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for UcanPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let encoded = format_payload(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", encoded)
    }
}

impl FromStr for UcanPayload {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_payload_segment(s)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
