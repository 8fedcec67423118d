//! Parsing of serialized tokens.
//!
//! Checks run in a fixed order and stop at the first failing stage: structure, header decoding,
//! header schema, payload decoding, payload schema, signature. Within a schema stage every
//! violation is reported together.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    decode_json, header_violations, is_valid_base64url, payload_violations, TokenPart, Ucan, UcanError, UcanHeader,
    UcanPayload, UcanResult, UcanSignature,
};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Parses a serialized token.
///
/// No semantic validation happens here. An expired token parses fine. See
/// [`validate_token`](crate::validate_token).
pub fn parse_token(token: &str) -> UcanResult<Ucan> {
    let [header, payload, signature] = split_token(token)?;

    let header = parse_header_segment(header)?;
    let payload = parse_payload_segment(payload)?;
    let signature = signature.parse::<UcanSignature>()?;

    tracing::debug!(issuer = payload.issuer(), alg = %header.alg(), "parsed ucan");

    Ok(Ucan::from_parts(header, payload, signature))
}

/// Parses a serialized token, returning `None` on any failure.
pub fn try_parse_token(token: &str) -> Option<Ucan> {
    parse_token(token).ok()
}

/// Checks that a token has three non-empty segments in the base64url alphabet.
///
/// Nothing is decoded. A token that passes may still fail [`parse_token`].
pub fn is_valid_jwt_format(token: &str) -> bool {
    split_token(token).is_ok_and(|parts| parts.iter().all(|part| is_valid_base64url(part)))
}

/// Decodes the header segment of a token as raw JSON.
///
/// Only the structure and the header's decoding are checked, not its schema.
pub fn extract_header(token: &str) -> UcanResult<Value> {
    let [header, _, _] = split_token(token)?;
    decode_segment(header, TokenPart::Header)
}

/// Decodes the payload segment of a token as raw JSON.
///
/// Only the structure and the payload's decoding are checked, not its schema.
pub fn extract_payload(token: &str) -> UcanResult<Value> {
    let [_, payload, _] = split_token(token)?;
    decode_segment(payload, TokenPart::Payload)
}

/// Decodes and checks a header segment.
pub fn parse_header_segment(segment: &str) -> UcanResult<UcanHeader> {
    let value = decode_segment(segment, TokenPart::Header)?;
    check_schema(value, TokenPart::Header, header_violations)
}

/// Decodes and checks a payload segment.
pub fn parse_payload_segment(segment: &str) -> UcanResult<UcanPayload> {
    let value = decode_segment(segment, TokenPart::Payload)?;
    check_schema(value, TokenPart::Payload, payload_violations)
}

fn split_token(token: &str) -> UcanResult<[&str; 3]> {
    if token.is_empty() {
        return Err(UcanError::Format("non-empty string required".to_string()));
    }

    let parts = token.split('.').collect::<Vec<_>>();
    let &[header, payload, signature] = parts.as_slice() else {
        return Err(UcanError::Format(format!(
            "expected 3 parts, got {}",
            parts.len()
        )));
    };

    for (part, segment) in [
        (TokenPart::Header, header),
        (TokenPart::Payload, payload),
        (TokenPart::Signature, signature),
    ] {
        if segment.is_empty() {
            return Err(UcanError::Format(format!("{part} segment must be non-empty")));
        }
    }

    Ok([header, payload, signature])
}

fn decode_segment(segment: &str, part: TokenPart) -> UcanResult<Value> {
    decode_json(segment).map_err(|e| UcanError::Decode(format!("{part}: {e}")))
}

fn check_schema<T>(value: Value, part: TokenPart, violations: fn(&Value) -> Vec<String>) -> UcanResult<T>
where
    T: DeserializeOwned,
{
    let violations = violations(&value);
    if !violations.is_empty() {
        tracing::debug!(%part, ?violations, "schema check failed");
        return Err(UcanError::Schema { part, violations });
    }

    serde_json::from_value(value).map_err(|e| UcanError::Schema {
        part,
        violations: vec![e.to_string()],
    })
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
