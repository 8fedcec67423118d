//! Base64url transport encoding for token segments.
//!
//! Encoding always produces the unpadded URL-safe alphabet. Decoding is lenient and also accepts
//! padded input.

use base64::prelude::{Engine, BASE64_URL_SAFE, BASE64_URL_SAFE_NO_PAD};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};

use crate::{UcanError, UcanResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

lazy_static! {
    static ref BASE64URL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9_-]*={0,2}$").expect("base64url pattern is valid");
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Encodes bytes as unpadded base64url.
pub fn encode_bytes(bytes: impl AsRef<[u8]>) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes base64url, padded or not.
pub fn decode_bytes(encoded: impl AsRef<str>) -> UcanResult<Vec<u8>> {
    let encoded = encoded.as_ref();
    BASE64_URL_SAFE_NO_PAD
        .decode(encoded)
        .or_else(|_| BASE64_URL_SAFE.decode(encoded))
        .map_err(|e| UcanError::Decode(format!("invalid base64url: {e}")))
}

/// Encodes the UTF-8 bytes of a string as unpadded base64url.
pub fn encode_string(value: impl AsRef<str>) -> String {
    encode_bytes(value.as_ref().as_bytes())
}

/// Decodes base64url into a UTF-8 string.
pub fn decode_string(encoded: impl AsRef<str>) -> UcanResult<String> {
    String::from_utf8(decode_bytes(encoded)?)
        .map_err(|e| UcanError::Decode(format!("invalid utf-8: {e}")))
}

/// Serializes a value to JSON and encodes it as base64url.
///
/// Key order follows the value's own serialization. Use
/// [`encode_canonical`](crate::encode_canonical) for signing input.
pub fn encode_json<T>(value: &T) -> UcanResult<String>
where
    T: Serialize + ?Sized,
{
    Ok(encode_string(serde_json::to_string(value)?))
}

/// Decodes base64url and parses the result as JSON.
pub fn decode_json<T>(encoded: impl AsRef<str>) -> UcanResult<T>
where
    T: DeserializeOwned,
{
    let bytes = decode_bytes(encoded)?;
    serde_json::from_slice(&bytes).map_err(|e| UcanError::Decode(format!("invalid json: {e}")))
}

/// Checks that a string only uses the base64url alphabet with at most two trailing `=`.
///
/// This is a syntactic check. A string that passes can still fail to decode.
pub fn is_valid_base64url(value: &str) -> bool {
    BASE64URL_REGEX.is_match(value)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_strategy::proptest;

    use super::*;

    #[test_log::test]
    fn test_encoding_uses_url_safe_alphabet_without_padding() -> anyhow::Result<()> {
        assert_eq!(encode_bytes([1, 2, 3, 4, 5]), "AQIDBAU");
        assert_eq!(encode_bytes([0xfb, 0xff]), "-_8");
        assert_eq!(encode_string(""), "");

        assert_eq!(decode_bytes("AQIDBAU")?, vec![1, 2, 3, 4, 5]);
        assert_eq!(decode_bytes("AQIDBAU=")?, vec![1, 2, 3, 4, 5]);
        assert_eq!(decode_bytes("-_8")?, vec![0xfb, 0xff]);

        Ok(())
    }

    #[test_log::test]
    fn test_decoding_rejects_foreign_alphabet() {
        assert!(matches!(decode_bytes("+/8"), Err(UcanError::Decode(_))));
        assert!(matches!(decode_bytes("a b"), Err(UcanError::Decode(_))));
        assert!(matches!(decode_string("_w"), Err(UcanError::Decode(_))));
    }

    #[test_log::test]
    fn test_json_segments() -> anyhow::Result<()> {
        let encoded = encode_json(&json!({ "alg": "EdDSA" }))?;
        tracing::debug!(?encoded);

        let decoded: Value = decode_json(&encoded)?;
        assert_eq!(decoded, json!({ "alg": "EdDSA" }));

        let not_json = encode_string("{alg");
        assert!(matches!(
            decode_json::<Value>(not_json),
            Err(UcanError::Decode(_))
        ));

        Ok(())
    }

    #[test_log::test]
    fn test_is_valid_base64url() {
        assert!(is_valid_base64url(""));
        assert!(is_valid_base64url("eyJhbGciOiJFZERTQSJ9"));
        assert!(is_valid_base64url("AQIDBAU="));
        assert!(is_valid_base64url("-_"));

        assert!(!is_valid_base64url("AQ==="));
        assert!(!is_valid_base64url("+/"));
        assert!(!is_valid_base64url("AQ=B"));
        assert!(!is_valid_base64url("has space"));
    }

    #[proptest]
    fn test_bytes_survive_encoding(bytes: Vec<u8>) {
        let encoded = encode_bytes(&bytes);
        assert!(is_valid_base64url(&encoded));
        assert_eq!(decode_bytes(&encoded).ok(), Some(bytes));
    }

    #[proptest]
    fn test_strings_survive_encoding(value: String) {
        assert_eq!(decode_string(encode_string(&value)).ok(), Some(value));
    }
}
