use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use sonr_key::JwsAlgorithm;

use crate::{format_header, parse_header_segment, UcanError, DEFAULT_VERSION, TOKEN_TYPE};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Represents the header part of a UCAN token: the signing algorithm and the UCAN spec version.
///
/// The `typ` field is always `"JWT"` and is not stored.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UcanHeader {
    /// The algorithm used for signing the token.
    alg: JwsAlgorithm,

    /// The UCAN spec version the token follows.
    ucv: String,
}

//--------------------------------------------------------------------------------------------------
// Types: Serde
//--------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct UcanHeaderSerde {
    alg: JwsAlgorithm,
    typ: String,
    ucv: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl UcanHeader {
    /// Creates a new header.
    pub fn new(alg: JwsAlgorithm, ucv: impl Into<String>) -> Self {
        Self {
            alg,
            ucv: ucv.into(),
        }
    }

    /// Returns the algorithm used for signing the token.
    pub fn alg(&self) -> JwsAlgorithm {
        self.alg
    }

    /// Returns the token type. Always `"JWT"`.
    pub fn typ(&self) -> &'static str {
        TOKEN_TYPE
    }

    /// Returns the UCAN spec version.
    pub fn version(&self) -> &str {
        &self.ucv
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Serialize for UcanHeader {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        UcanHeaderSerde {
            alg: self.alg,
            typ: TOKEN_TYPE.to_string(),
            ucv: self.ucv.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UcanHeader {
    fn deserialize<D>(deserializer: D) -> Result<UcanHeader, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let header = UcanHeaderSerde::deserialize(deserializer)?;

        if header.typ != TOKEN_TYPE {
            return Err(serde::de::Error::custom(format!(
                "unsupported token type {:?}",
                header.typ
            )));
        }

        Ok(UcanHeader::new(header.alg, header.ucv))
    }
}

impl Display for UcanHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let encoded = format_header(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", encoded)
    }
}

impl FromStr for UcanHeader {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_header_segment(s)
    }
}

impl Default for UcanHeader {
    fn default() -> Self {
        Self::new(JwsAlgorithm::EdDSA, DEFAULT_VERSION)
    }
}

impl From<JwsAlgorithm> for UcanHeader {
    fn from(alg: JwsAlgorithm) -> Self {
        Self::new(alg, DEFAULT_VERSION)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_header_serde() -> anyhow::Result<()> {
        let header = UcanHeader::default();

        let serialized = serde_json::to_string(&header)?;
        tracing::debug!(?serialized);
        assert_eq!(serialized, r#"{"alg":"EdDSA","typ":"JWT","ucv":"0.10.0"}"#);

        let deserialized: UcanHeader = serde_json::from_str(&serialized)?;
        assert_eq!(deserialized, header);

        let result = serde_json::from_str::<UcanHeader>(r#"{"alg":"EdDSA","typ":"JWS","ucv":"0.10.0"}"#);
        assert!(result.is_err());

        Ok(())
    }

    #[test_log::test]
    fn test_header_display() -> anyhow::Result<()> {
        let header = UcanHeader::default();

        let displayed = header.to_string();
        tracing::debug!(?displayed);
        assert_eq!(
            displayed,
            "eyJhbGciOiJFZERTQSIsInR5cCI6IkpXVCIsInVjdiI6IjAuMTAuMCJ9"
        );

        let parsed = UcanHeader::from_str(&displayed)?;
        assert_eq!(parsed, header);

        let header = UcanHeader::new(JwsAlgorithm::ES256, "0.9.1");
        let parsed = UcanHeader::from_str(&header.to_string())?;
        assert_eq!(parsed.alg(), JwsAlgorithm::ES256);
        assert_eq!(parsed.version(), "0.9.1");
        assert_eq!(parsed.typ(), "JWT");

        Ok(())
    }
}
