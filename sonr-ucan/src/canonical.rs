//! Deterministic JSON serialization.
//!
//! Signatures cover the exact bytes of the encoded header and payload, so two equal values must
//! always produce the same text. Object keys are emitted in ascending UTF-16 code unit order at
//! every nesting level, matching how JavaScript sorts strings. Arrays keep their order and no
//! whitespace is inserted.
//!
//! A [`Value`] keeps its keys in byte order, which differs from UTF-16 order once keys mix
//! characters above U+E000 with supplementary-plane characters. Only the text produced by
//! [`to_canonical_json`] carries the canonical order.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{encode_string, UcanResult};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns a copy of `value` with every object's keys sorted recursively.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries = map.iter().collect::<Vec<_>>();
            entries.sort_by(|(a, _), (b, _)| utf16_order(a, b));

            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), canonicalize(value)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        primitive => primitive.clone(),
    }
}

/// Serializes `value` into its canonical JSON value.
///
/// Fields skipped by the type's serde attributes are absent, never `null`.
pub fn to_canonical_value<T>(value: &T) -> UcanResult<Value>
where
    T: Serialize + ?Sized,
{
    Ok(canonicalize(&serde_json::to_value(value)?))
}

/// Serializes `value` into canonical JSON text.
pub fn to_canonical_json<T>(value: &T) -> UcanResult<String>
where
    T: Serialize + ?Sized,
{
    let mut text = String::new();
    write_canonical(&serde_json::to_value(value)?, &mut text)?;
    Ok(text)
}

/// Serializes `value` into canonical JSON text and encodes it as base64url.
pub fn encode_canonical<T>(value: &T) -> UcanResult<String>
where
    T: Serialize + ?Sized,
{
    Ok(encode_string(to_canonical_json(value)?))
}

fn write_canonical(value: &Value, text: &mut String) -> UcanResult<()> {
    match value {
        Value::Object(map) => {
            let mut entries = map.iter().collect::<Vec<_>>();
            entries.sort_by(|(a, _), (b, _)| utf16_order(a, b));

            text.push('{');
            for (index, (key, value)) in entries.into_iter().enumerate() {
                if index > 0 {
                    text.push(',');
                }
                text.push_str(&serde_json::to_string(key)?);
                text.push(':');
                write_canonical(value, text)?;
            }
            text.push('}');
        }
        Value::Array(items) => {
            text.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    text.push(',');
                }
                write_canonical(item, text)?;
            }
            text.push(']');
        }
        primitive => text.push_str(&serde_json::to_string(primitive)?),
    }

    Ok(())
}

fn utf16_order(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
