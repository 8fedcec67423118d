use std::{fmt::Display, str::FromStr};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use sonr_key::JwsAlgorithm;

use crate::{
    format_token, header_violations, parse_token, payload_violations, signing_message, validate_token, Capability, UcanBuilder, UcanError,
    UcanFact, UcanHeader, UcanPayload, UcanResult, UcanSignature, ValidationOptions,
    ValidationResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A parsed or built UCAN token.
///
/// A `Ucan` is immutable. Delegating authority produces a new token that lists this one as a proof.
///
/// Its [`Display`] is the `<header>.<payload>.<signature>` wire form and its serde form is
/// `{"header": .., "payload": .., "signature": [..]}`. Deserializing runs the same schema checks
/// as [`parse_token`].
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct Ucan {
    header: UcanHeader,
    payload: UcanPayload,
    signature: UcanSignature,
}

//--------------------------------------------------------------------------------------------------
// Types: Serde
//--------------------------------------------------------------------------------------------------

#[derive(Deserialize)]
struct UcanSerde {
    header: Value,
    payload: Value,
    signature: UcanSignature,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Ucan {
    /// Creates a new builder for constructing a token.
    pub fn builder() -> UcanBuilder {
        UcanBuilder::default()
    }

    /// Assembles a token from its parts.
    pub fn from_parts(
        header: UcanHeader,
        payload: UcanPayload,
        signature: impl Into<UcanSignature>,
    ) -> Self {
        Self {
            header,
            payload,
            signature: signature.into(),
        }
    }

    /// Returns the header.
    pub fn header(&self) -> &UcanHeader {
        &self.header
    }

    /// Returns the payload.
    pub fn payload(&self) -> &UcanPayload {
        &self.payload
    }

    /// Returns the signature.
    pub fn signature(&self) -> &UcanSignature {
        &self.signature
    }

    /// Returns the signing algorithm named in the header.
    pub fn algorithm(&self) -> JwsAlgorithm {
        self.header.alg()
    }

    /// Returns the issuer DID.
    pub fn issuer(&self) -> &str {
        self.payload.issuer()
    }

    /// Returns the audience DID.
    pub fn audience(&self) -> &str {
        self.payload.audience()
    }

    /// Returns the expiration time. `None` means the token never expires.
    pub fn expiration(&self) -> Option<i64> {
        self.payload.expiration()
    }

    /// Returns the not-before time.
    pub fn not_before(&self) -> Option<i64> {
        self.payload.not_before()
    }

    /// Returns the nonce.
    pub fn nonce(&self) -> Option<&str> {
        self.payload.nonce()
    }

    /// Returns the facts.
    pub fn facts(&self) -> &[UcanFact] {
        self.payload.facts()
    }

    /// Returns the serialized proof tokens.
    pub fn proofs(&self) -> &[String] {
        self.payload.proofs()
    }

    /// Returns the capabilities.
    pub fn capabilities(&self) -> &[Capability] {
        self.payload.capabilities()
    }

    /// Parses every proof token.
    pub fn parse_proofs(&self) -> UcanResult<Vec<Ucan>> {
        self.proofs().iter().map(|proof| parse_token(proof)).collect()
    }

    /// Returns the message the signature covers.
    pub fn signing_message(&self) -> UcanResult<String> {
        signing_message(&self.header, &self.payload)
    }

    /// Serializes the token into its wire form.
    pub fn encode(&self) -> UcanResult<String> {
        format_token(self)
    }

    /// Validates the token. See [`validate_token`].
    pub fn validate(&self, options: &ValidationOptions) -> ValidationResult {
        validate_token(self, options)
    }

    /// Checks if this token's validity window covers all of `other`'s.
    ///
    /// A token without `nbf` starts at the beginning of time and one without `exp` never ends.
    pub fn lifetime_encompasses(&self, other: &Ucan) -> bool {
        let begins_before = match (self.not_before(), other.not_before()) {
            (Some(nbf), Some(other_nbf)) => nbf <= other_nbf,
            (Some(_), None) => false,
            (None, _) => true,
        };

        let ends_after = match (self.expiration(), other.expiration()) {
            (Some(exp), Some(other_exp)) => exp >= other_exp,
            (Some(_), None) => false,
            (None, _) => true,
        };

        begins_before && ends_after
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for Ucan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let encoded = format_token(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", encoded)
    }
}

impl FromStr for Ucan {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s)
    }
}

impl TryFrom<&str> for Ucan {
    type Error = UcanError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        parse_token(value)
    }
}

impl<'de> Deserialize<'de> for Ucan {
    fn deserialize<D>(deserializer: D) -> Result<Ucan, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let UcanSerde {
            header,
            payload,
            signature,
        } = UcanSerde::deserialize(deserializer)?;

        let header = checked::<UcanHeader, D::Error>(header, header_violations, "header")?;
        let payload = checked::<UcanPayload, D::Error>(payload, payload_violations, "payload")?;

        Ok(Ucan::from_parts(header, payload, signature))
    }
}

fn checked<T, E>(value: Value, violations: fn(&Value) -> Vec<String>, part: &str) -> Result<T, E>
where
    T: DeserializeOwned,
    E: serde::de::Error,
{
    let violations = violations(&value);
    if !violations.is_empty() {
        return Err(E::custom(format!("invalid {part}: {}", violations.join("; "))));
    }

    serde_json::from_value(value).map_err(E::custom)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::is_token_shape;

    use super::*;

    fn token(not_before: Option<i64>, expiration: Option<i64>) -> Ucan {
        let mut payload = UcanPayload::new(
            "did:key:alice",
            "did:key:bob",
            expiration,
            vec![Capability::new("storage://photos", "crud/read")],
        );
        payload.not_before = not_before;

        Ucan::from_parts(UcanHeader::default(), payload, vec![1u8, 2, 3, 4, 5])
    }

    #[test_log::test]
    fn test_ucan_serde() -> anyhow::Result<()> {
        let ucan = token(Some(100), Some(200));

        let value = serde_json::to_value(&ucan)?;
        tracing::debug!(?value);
        assert!(is_token_shape(&value));
        assert_eq!(value["signature"], json!([1, 2, 3, 4, 5]));
        assert_eq!(value["header"]["typ"], json!("JWT"));

        let deserialized: Ucan = serde_json::from_value(value)?;
        assert_eq!(deserialized, ucan);

        Ok(())
    }

    #[test_log::test]
    fn test_ucan_deserialize_rejects_invalid_parts() -> anyhow::Result<()> {
        let mut value = serde_json::to_value(token(None, None))?;
        value["payload"] = json!({ "iss": "", "aud": "", "exp": null, "att": [] });

        let error = serde_json::from_value::<Ucan>(value.clone()).unwrap_err();
        assert!(error.to_string().contains("invalid payload"), "{error}");

        value["payload"] = serde_json::to_value(token(None, None).payload())?;
        value["header"]["alg"] = json!("none");
        let error = serde_json::from_value::<Ucan>(value).unwrap_err();
        assert!(error.to_string().contains("invalid header"), "{error}");

        Ok(())
    }

    #[test_log::test]
    fn test_ucan_display() -> anyhow::Result<()> {
        let ucan = token(None, None);

        let displayed = ucan.to_string();
        tracing::debug!(?displayed);
        assert_eq!(displayed, ucan.encode()?);
        assert!(displayed.ends_with(".AQIDBAU"));

        let parsed = Ucan::from_str(&displayed)?;
        assert_eq!(parsed, ucan);
        assert_eq!(Ucan::try_from(displayed.as_str())?, ucan);
        assert_eq!(parsed.signing_message()?, displayed.rsplit_once('.').map(|(m, _)| m.to_string()).unwrap_or_default());

        Ok(())
    }

    #[test_log::test]
    fn test_lifetime_encompasses() {
        let forever = token(None, None);
        let window = token(Some(100), Some(200));
        let inner = token(Some(120), Some(180));
        let late = token(Some(150), Some(250));
        let open_ended = token(Some(100), None);

        assert!(forever.lifetime_encompasses(&window));
        assert!(window.lifetime_encompasses(&window));
        assert!(window.lifetime_encompasses(&inner));

        assert!(!window.lifetime_encompasses(&late));
        assert!(!window.lifetime_encompasses(&forever));
        assert!(!window.lifetime_encompasses(&open_ended));
        assert!(!inner.lifetime_encompasses(&window));
    }
}
