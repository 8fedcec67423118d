use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The wildcard that matches any remainder of a resource or ability.
pub const WILDCARD: &str = "*";

/// The separator between ability segments.
pub const ABILITY_SEPARATOR: char = '/';

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Open key-value constraints attached to a capability, e.g. `{"maxSize": 1024}`.
pub type Caveats = Map<String, Value>;

/// A single grant: an ability on a resource, optionally narrowed by caveats.
///
/// Serializes as `{"with": .., "can": .., "nb": ..}` where `nb` is omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// The resource URI the grant applies to.
    #[serde(rename = "with")]
    resource: String,

    /// The action allowed on the resource.
    #[serde(rename = "can")]
    ability: String,

    /// Additional constraints on the grant.
    #[serde(rename = "nb", default, skip_serializing_if = "Option::is_none")]
    caveats: Option<Caveats>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Capability {
    /// Creates a capability without caveats.
    pub fn new(resource: impl Into<String>, ability: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ability: ability.into(),
            caveats: None,
        }
    }

    /// Returns the capability with the given caveats attached.
    pub fn with_caveats(self, caveats: Caveats) -> Self {
        Self {
            caveats: Some(caveats),
            ..self
        }
    }

    /// Returns the resource URI.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns the ability.
    pub fn ability(&self) -> &str {
        &self.ability
    }

    /// Returns the caveats, if any.
    pub fn caveats(&self) -> Option<&Caveats> {
        self.caveats.as_ref()
    }

    /// Checks if this capability covers the `requested` resource and ability.
    ///
    /// Caveats are not considered. See [`caveats_permit`](Self::caveats_permit).
    pub fn permits(&self, requested: &Capability) -> bool {
        resource_permits(&self.resource, &requested.resource)
            && ability_permits(&self.ability, &requested.ability)
    }

    /// Checks if the `requested` caveats are equal to or narrower than these.
    pub fn caveats_permit(&self, requested: &Capability) -> bool {
        caveats_permit(self.caveats.as_ref(), requested.caveats.as_ref())
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Checks if the `parent` resource covers the `child` resource.
///
/// - `*` covers every resource.
/// - A trailing `*` covers any non-empty remainder after the prefix, e.g. `storage://*`
///   covers `storage://photos`. The prefix must end at a `/` or `:`.
/// - Any other resource covers itself and its sub-paths, e.g. `storage://photos` covers
///   `storage://photos/2024` but not `storage://photos-archive`.
pub fn resource_permits(parent: &str, child: &str) -> bool {
    if parent == WILDCARD || parent == child {
        return true;
    }

    if let Some(prefix) = parent.strip_suffix(WILDCARD) {
        if !prefix.ends_with(['/', ':']) {
            return false;
        }

        return child.len() > prefix.len() && child.starts_with(prefix);
    }

    if parent.ends_with('/') {
        return child.starts_with(parent);
    }

    child
        .strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with(['/', '?', '#']))
}

/// Checks if the `parent` ability covers the `child` ability.
///
/// Abilities are `/`-separated paths compared case-insensitively, segment by segment. A `*`
/// segment matches any single non-empty segment and `*` alone matches every ability. A child
/// may extend its parent with more segments, e.g. `crud` covers `crud/read`.
pub fn ability_permits(parent: &str, child: &str) -> bool {
    if parent == WILDCARD {
        return true;
    }

    for items in parent
        .split(ABILITY_SEPARATOR)
        .zip_longest(child.split(ABILITY_SEPARATOR))
    {
        match items {
            EitherOrBoth::Both(segment, requested) => {
                if requested.is_empty() {
                    return false;
                }

                if segment != WILDCARD && !segment.eq_ignore_ascii_case(requested) {
                    return false;
                }
            }
            EitherOrBoth::Left(_) => return false,
            EitherOrBoth::Right(requested) => {
                if requested.is_empty() {
                    return false;
                }
            }
        }
    }

    true
}

/// Checks if `child` caveats are equal to or narrower than `parent` caveats.
///
/// Every parent field must be present in the child with a value that is a subset of the parent's:
/// objects by key, arrays by position and scalars by equality. A parent without caveats permits
/// anything.
pub fn caveats_permit(parent: Option<&Caveats>, child: Option<&Caveats>) -> bool {
    match (parent, child) {
        (None, _) => true,
        (Some(parent), _) if parent.is_empty() => true,
        (Some(_), None) => false,
        (Some(parent), Some(child)) => parent.iter().all(|(key, value)| {
            child
                .get(key)
                .is_some_and(|requested| is_subset(value, requested))
        }),
    }
}

fn is_subset(this: &Value, that: &Value) -> bool {
    match (this, that) {
        (Value::Object(this_map), Value::Object(that_map)) => this_map.iter().all(|(key, value)| {
            that_map
                .get(key)
                .is_some_and(|that_value| is_subset(value, that_value))
        }),
        (Value::Array(this_array), Value::Array(that_array)) => {
            this_array.len() <= that_array.len()
                && this_array
                    .iter()
                    .zip(that_array.iter())
                    .all(|(this_value, that_value)| is_subset(this_value, that_value))
        }
        (this_value, that_value) => this_value == that_value,
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test_log::test]
    fn test_capability_serde() -> anyhow::Result<()> {
        let capability = Capability::new("storage://photos", "crud/read");
        let serialized = serde_json::to_string(&capability)?;
        tracing::debug!(?serialized);
        assert_eq!(serialized, r#"{"with":"storage://photos","can":"crud/read"}"#);

        let capability = capability.with_caveats(Caveats::from_iter([(
            "maxSize".to_string(),
            json!(1024),
        )]));
        let serialized = serde_json::to_string(&capability)?;
        assert_eq!(
            serialized,
            r#"{"with":"storage://photos","can":"crud/read","nb":{"maxSize":1024}}"#
        );

        let deserialized: Capability = serde_json::from_str(&serialized)?;
        assert_eq!(deserialized, capability);

        Ok(())
    }

    #[test_log::test]
    fn test_resource_permits() {
        assert!(resource_permits("*", "anything://at/all"));
        assert!(resource_permits("storage://*", "storage://photos"));
        assert!(resource_permits("storage://photos", "storage://photos"));
        assert!(resource_permits("storage://photos", "storage://photos/2024"));
        assert!(resource_permits("storage://photos/", "storage://photos/2024"));
        assert!(resource_permits("storage://bucket/*", "storage://bucket/x/y"));

        assert!(!resource_permits("storage://*", "different://x"));
        assert!(!resource_permits("storage://*", "storage://"));
        assert!(!resource_permits("storage://bucket", "storage://bucket-other/x"));
        assert!(!resource_permits("storage://bucket/*", "storage://bucket-other/x"));
        assert!(!resource_permits("storage://buck*", "storage://bucket"));
        assert!(!resource_permits("storage://photos/2024", "storage://photos"));
    }

    #[test_log::test]
    fn test_ability_permits() {
        assert!(ability_permits("*", "crud/read"));
        assert!(ability_permits("crud/*", "crud/read"));
        assert!(ability_permits("crud/*", "crud/read/deep"));
        assert!(ability_permits("crud", "crud/read"));
        assert!(ability_permits("crud/read", "CRUD/Read"));
        assert!(ability_permits("msg/send", "msg/send"));

        assert!(!ability_permits("crud/*", "crud"));
        assert!(!ability_permits("crud/*", "crud/"));
        assert!(!ability_permits("crud/read", "crud/write"));
        assert!(!ability_permits("crud/read", "crud"));
        assert!(!ability_permits("crud", "crudx"));
        assert!(!ability_permits("msg/*", "crud/read"));
    }

    #[test_log::test]
    fn test_capability_permits() {
        let parent = Capability::new("storage://*", "crud/*");

        assert!(parent.permits(&Capability::new("storage://photos", "crud/read")));
        assert!(!parent.permits(&Capability::new("different://x", "crud/*")));
        assert!(!parent.permits(&Capability::new("storage://photos", "msg/send")));
    }

    #[test_log::test]
    fn test_caveats_permit() {
        let caveats = |value: Value| match value {
            Value::Object(map) => map,
            _ => Caveats::new(),
        };

        let parent = caveats(json!({ "maxSize": 1024, "types": ["jpg", "png"] }));
        let narrower = caveats(json!({ "maxSize": 1024, "types": ["jpg", "png", "gif"], "extra": true }));
        let different = caveats(json!({ "maxSize": 2048, "types": ["jpg", "png"] }));
        let missing = caveats(json!({ "types": ["jpg", "png"] }));

        assert!(caveats_permit(None, None));
        assert!(caveats_permit(None, Some(&parent)));
        assert!(caveats_permit(Some(&Caveats::new()), None));
        assert!(caveats_permit(Some(&parent), Some(&parent)));
        assert!(caveats_permit(Some(&parent), Some(&narrower)));

        assert!(!caveats_permit(Some(&parent), None));
        assert!(!caveats_permit(Some(&parent), Some(&different)));
        assert!(!caveats_permit(Some(&parent), Some(&missing)));
    }
}
