use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::KeyError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// JSON Web Signature (JWS) algorithm used in the `alg` field of a UCAN header.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JwsAlgorithm {
    /// EdDSA using `ed25519`.
    #[serde(rename = "EdDSA")]
    EdDSA,

    /// ECDSA using P-256 and SHA-256.
    #[serde(rename = "ES256")]
    ES256,

    /// RSASSA-PKCS1-v1_5 using SHA-256.
    #[serde(rename = "RS256")]
    RS256,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl JwsAlgorithm {
    /// All supported algorithms.
    pub const ALL: [JwsAlgorithm; 3] = [
        JwsAlgorithm::EdDSA,
        JwsAlgorithm::ES256,
        JwsAlgorithm::RS256,
    ];

    /// Returns the registered JWS name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            JwsAlgorithm::EdDSA => "EdDSA",
            JwsAlgorithm::ES256 => "ES256",
            JwsAlgorithm::RS256 => "RS256",
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for JwsAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JwsAlgorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EdDSA" => Ok(JwsAlgorithm::EdDSA),
            "ES256" => Ok(JwsAlgorithm::ES256),
            "RS256" => Ok(JwsAlgorithm::RS256),
            s => Err(KeyError::UnsupportedJwsAlgorithm(s.to_string())),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
