//! Serialization of token parts into their wire form.
//!
//! Every part goes through the canonical serializer, so formatting the same header and payload
//! always yields the same signing message.

use crate::{encode_bytes, encode_canonical, Ucan, UcanHeader, UcanPayload, UcanResult};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Encodes a header as base64url canonical JSON.
pub fn format_header(header: &UcanHeader) -> UcanResult<String> {
    encode_canonical(header)
}

/// Encodes a payload as base64url canonical JSON.
pub fn format_payload(payload: &UcanPayload) -> UcanResult<String> {
    encode_canonical(payload)
}

/// Returns the exact message a signature covers: `<header>.<payload>`.
pub fn signing_message(header: &UcanHeader, payload: &UcanPayload) -> UcanResult<String> {
    Ok(format!(
        "{}.{}",
        format_header(header)?,
        format_payload(payload)?
    ))
}

/// Serializes a token as `<header>.<payload>.<signature>`.
pub fn format_token(token: &Ucan) -> UcanResult<String> {
    Ok(format!(
        "{}.{}",
        signing_message(token.header(), token.payload())?,
        encode_bytes(token.signature().as_bytes())
    ))
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::{decode_string, Capability, UcanSignature};

    use super::*;

    #[test_log::test]
    fn test_format_token() -> anyhow::Result<()> {
        let header = UcanHeader::default();
        let payload = UcanPayload::new(
            "did:key:alice",
            "did:key:bob",
            Some(1700000000),
            vec![Capability::new("storage://photos", "crud/read")],
        );
        let token = Ucan::from_parts(header.clone(), payload.clone(), UcanSignature::from(vec![1, 2, 3, 4, 5]));

        let formatted = format_token(&token)?;
        tracing::debug!(?formatted);

        let parts = formatted.split('.').collect::<Vec<_>>();
        assert_eq!(parts.len(), 3);
        assert_eq!(decode_string(parts[0])?, r#"{"alg":"EdDSA","typ":"JWT","ucv":"0.10.0"}"#);
        assert_eq!(
            decode_string(parts[1])?,
            r#"{"att":[{"can":"crud/read","with":"storage://photos"}],"aud":"did:key:bob","exp":1700000000,"iss":"did:key:alice"}"#
        );
        assert_eq!(parts[2], "AQIDBAU");

        assert_eq!(
            signing_message(&header, &payload)?,
            format!("{}.{}", parts[0], parts[1])
        );

        Ok(())
    }
}
