//! Structural predicates for decoded token JSON.
//!
//! The `*_violations` functions collect every problem found in a value so callers can report them
//! all at once. The `is_*` predicates are the boolean form of the same checks.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use sonr_key::JwsAlgorithm;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The JWT `typ` every UCAN header carries.
pub const TOKEN_TYPE: &str = "JWT";

/// The largest integer a JSON number can hold without losing precision.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// The smallest integer a JSON number can hold without losing precision.
pub const MIN_SAFE_INTEGER: i64 = -MAX_SAFE_INTEGER;

lazy_static! {
    static ref DID_REGEX: Regex = Regex::new(r"^did:[a-z0-9]+:[^\s]+$").expect("did pattern is valid");
}

//--------------------------------------------------------------------------------------------------
// Functions: Primitives
//--------------------------------------------------------------------------------------------------

/// Checks that `value` looks like a DID: `did:<method>:<method-specific-id>`.
///
/// Only the shape is checked. The DID is not resolved.
pub fn is_valid_did(value: &str) -> bool {
    DID_REGEX.is_match(value)
}

/// Checks that `value` is an integer within the safe JSON range.
pub fn is_safe_integer(value: &Value) -> bool {
    value
        .as_i64()
        .is_some_and(|n| (MIN_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&n))
}

/// Checks that `value` is an integer timestamp within the safe JSON range.
pub fn is_safe_timestamp(value: i64) -> bool {
    (MIN_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&value)
}

fn is_non_empty_string(value: Option<&Value>) -> bool {
    value.and_then(Value::as_str).is_some_and(|s| !s.is_empty())
}

//--------------------------------------------------------------------------------------------------
// Functions: Header
//--------------------------------------------------------------------------------------------------

/// Lists every way `value` fails to be a UCAN header.
pub fn header_violations(value: &Value) -> Vec<String> {
    let Some(header) = value.as_object() else {
        return vec!["header must be a JSON object".to_string()];
    };

    let mut violations = Vec::new();

    match header.get("alg").and_then(Value::as_str) {
        None => violations.push("missing or invalid 'alg' field".to_string()),
        Some(alg) if alg.parse::<JwsAlgorithm>().is_err() => violations.push(format!(
            "unsupported 'alg' value {alg:?} (expected one of {})",
            JwsAlgorithm::ALL.map(|a| a.as_str()).join(", ")
        )),
        Some(_) => {}
    }

    if header.get("typ").and_then(Value::as_str) != Some(TOKEN_TYPE) {
        violations.push(format!("missing or invalid 'typ' field (expected {TOKEN_TYPE:?})"));
    }

    if !is_non_empty_string(header.get("ucv")) {
        violations.push("missing or invalid 'ucv' field".to_string());
    }

    violations
}

/// Checks that `value` is a UCAN header.
pub fn is_header(value: &Value) -> bool {
    header_violations(value).is_empty()
}

//--------------------------------------------------------------------------------------------------
// Functions: Capability
//--------------------------------------------------------------------------------------------------

/// Lists every way `value` fails to be the capability at position `index` of an `att` array.
pub fn capability_violations(value: &Value, index: usize) -> Vec<String> {
    let Some(capability) = value.as_object() else {
        return vec![format!("Capability at index {index} must be an object")];
    };

    let mut violations = Vec::new();

    if !is_non_empty_string(capability.get("with")) {
        violations.push(format!(
            "Capability at index {index} missing or invalid 'with' field"
        ));
    }

    if !is_non_empty_string(capability.get("can")) {
        violations.push(format!(
            "Capability at index {index} missing or invalid 'can' field"
        ));
    }

    if capability.get("nb").is_some_and(|nb| !nb.is_object()) {
        violations.push(format!(
            "Capability at index {index} has invalid 'nb' field (expected object)"
        ));
    }

    violations
}

/// Checks that `value` is a capability.
pub fn is_capability(value: &Value) -> bool {
    capability_violations(value, 0).is_empty()
}

//--------------------------------------------------------------------------------------------------
// Functions: Payload
//--------------------------------------------------------------------------------------------------

/// Lists every way `value` fails to be a UCAN payload.
pub fn payload_violations(value: &Value) -> Vec<String> {
    let Some(payload) = value.as_object() else {
        return vec!["payload must be a JSON object".to_string()];
    };

    let mut violations = Vec::new();

    if !is_non_empty_string(payload.get("iss")) {
        violations.push("missing or invalid 'iss' field".to_string());
    }

    if !is_non_empty_string(payload.get("aud")) {
        violations.push("missing or invalid 'aud' field".to_string());
    }

    match payload.get("exp") {
        Some(Value::Null) => {}
        Some(exp) if is_safe_integer(exp) => {}
        _ => violations.push("'exp' must be an integer timestamp or null".to_string()),
    }

    if payload.get("nbf").is_some_and(|nbf| !is_safe_integer(nbf)) {
        violations.push("'nbf' must be an integer timestamp".to_string());
    }

    if payload.get("nnc").is_some_and(|nnc| !nnc.is_string()) {
        violations.push("'nnc' must be a string".to_string());
    }

    violations.extend(optional_array_violations(payload, "fct", "Fact", |fact| {
        fact.is_object().then_some(()).ok_or("must be an object")
    }));

    violations.extend(optional_array_violations(payload, "prf", "Proof", |proof| {
        is_non_empty_string(Some(proof))
            .then_some(())
            .ok_or("must be a non-empty string")
    }));

    match payload.get("att").and_then(Value::as_array) {
        None => violations.push("missing or invalid 'att' field".to_string()),
        Some(capabilities) if capabilities.is_empty() => {
            violations.push("'att' must contain at least one capability".to_string())
        }
        Some(capabilities) => {
            for (index, capability) in capabilities.iter().enumerate() {
                violations.extend(capability_violations(capability, index));
            }
        }
    }

    violations
}

/// Checks that `value` is a UCAN payload.
pub fn is_payload(value: &Value) -> bool {
    payload_violations(value).is_empty()
}

//--------------------------------------------------------------------------------------------------
// Functions: Token
//--------------------------------------------------------------------------------------------------

/// Checks that `value` is the JSON form of a decoded token:
/// `{ "header": .., "payload": .., "signature": [bytes] }` with a non-empty signature.
pub fn is_token_shape(value: &Value) -> bool {
    let Some(token) = value.as_object() else {
        return false;
    };

    let signature_ok = token
        .get("signature")
        .and_then(Value::as_array)
        .is_some_and(|bytes| {
            !bytes.is_empty()
                && bytes
                    .iter()
                    .all(|b| b.as_u64().is_some_and(|b| b <= u8::MAX as u64))
        });

    signature_ok
        && token.get("header").is_some_and(is_header)
        && token.get("payload").is_some_and(is_payload)
}

fn optional_array_violations(
    object: &Map<String, Value>,
    field: &str,
    label: &str,
    check: impl Fn(&Value) -> Result<(), &'static str>,
) -> Vec<String> {
    match object.get(field) {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                check(item)
                    .err()
                    .map(|problem| format!("{label} at index {index} {problem}"))
            })
            .collect(),
        Some(_) => vec![format!("'{field}' must be an array")],
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
