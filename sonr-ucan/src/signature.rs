use std::{fmt::Display, ops::Deref, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{decode_bytes, encode_bytes, UcanError};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Represents the digital signature of a UCAN token.
///
/// The signature covers the signing message `<header>.<payload>` and is produced by the
/// issuer's private key. It is always non-empty in a parsed or built token.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UcanSignature(Vec<u8>);

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl UcanSignature {
    /// Returns the raw bytes of the signature.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Converts the signature into a vector of bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.clone()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Serialize for UcanSignature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UcanSignature {
    fn deserialize<D>(deserializer: D) -> Result<UcanSignature, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let signature = Vec::<u8>::deserialize(deserializer)?;
        if signature.is_empty() {
            return Err(serde::de::Error::custom("signature must be non-empty"));
        }

        Ok(UcanSignature(signature))
    }
}

impl Display for UcanSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", encode_bytes(&self.0))
    }
}

impl FromStr for UcanSignature {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = decode_bytes(s)
            .map_err(|e| UcanError::Format(format!("signature must be non-empty base64url: {e}")))?;

        if decoded.is_empty() {
            return Err(UcanError::Format("signature must be non-empty".to_string()));
        }

        Ok(UcanSignature(decoded))
    }
}

impl From<Vec<u8>> for UcanSignature {
    fn from(signature: Vec<u8>) -> Self {
        Self(signature)
    }
}

impl From<&[u8]> for UcanSignature {
    fn from(signature: &[u8]) -> Self {
        Self(signature.to_vec())
    }
}

impl From<UcanSignature> for Vec<u8> {
    fn from(signature: UcanSignature) -> Self {
        signature.0
    }
}

impl Deref for UcanSignature {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_signature_serde() -> anyhow::Result<()> {
        let signature = UcanSignature::from(vec![1, 2, 3, 4, 5]);

        let serialized = serde_json::to_string(&signature)?;
        tracing::debug!(?serialized);
        assert_eq!(serialized, "[1,2,3,4,5]");

        let deserialized: UcanSignature = serde_json::from_str(&serialized)?;
        assert_eq!(deserialized, signature);

        assert!(serde_json::from_str::<UcanSignature>("[]").is_err());

        Ok(())
    }

    #[test_log::test]
    fn test_signature_display() -> anyhow::Result<()> {
        let signature = UcanSignature::from(vec![1, 2, 3, 4, 5]);

        let displayed = signature.to_string();
        tracing::debug!(?displayed);
        assert_eq!(displayed, "AQIDBAU");

        let parsed = UcanSignature::from_str(&displayed)?;
        assert_eq!(parsed, signature);

        assert!(matches!(UcanSignature::from_str("!!"), Err(UcanError::Format(_))));

        Ok(())
    }
}
