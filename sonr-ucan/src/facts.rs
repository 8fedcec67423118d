use serde_json::{Map, Value};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An assertion carried in a UCAN's `fct` array, stored as a JSON object.
///
/// Facts are signed along with the rest of the payload but grant no authority.
pub type UcanFact = Map<String, Value>;

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test_log::test]
    fn test_ucan_fact_serde() -> anyhow::Result<()> {
        let mut fact = UcanFact::new();
        fact.insert("key2".to_string(), json!("value2"));
        fact.insert("key1".to_string(), json!({ "nested": [1, 2] }));

        let serialized = serde_json::to_string(&fact)?;
        tracing::debug!(?serialized);
        let deserialized: UcanFact = serde_json::from_str(&serialized)?;
        assert_eq!(fact, deserialized);

        Ok(())
    }
}
