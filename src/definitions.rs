//! Splitting reflected schemas into an inline fragment and shared definitions.
//!
//! Reflection embeds every named sub-schema under a `definitions` key. The
//! document keeps a single registry of those under `components.schemas`, so
//! each reflected schema is split before being placed into an operation.

use crate::casing::camelize;
use serde_json::{Map, Value};

/// Key under which reflected schemas carry their named sub-schemas.
pub const DEFINITIONS_KEY: &str = "definitions";

/// Named definitions extracted from a reflected schema.
pub type Definitions = Map<String, Value>;

/// Separates `schema` into its definitions and the schema without them.
///
/// Non-object schemas have no definitions and are returned unchanged.
pub fn split_definitions(schema: &Value) -> (Definitions, Value) {
    let mut new_schema = schema.clone();
    let definitions = match new_schema.as_object_mut() {
        Some(object) => match object.remove(DEFINITIONS_KEY) {
            Some(Value::Object(definitions)) => definitions,
            _ => Map::new(),
        },
        None => Map::new(),
    };
    (definitions, new_schema)
}

/// Like [`split_definitions`], camelizing both halves when `convert_casing`
/// is set. Definition names are left as they are.
pub fn split_convert_definitions(schema: &Value, convert_casing: bool) -> (Definitions, Value) {
    let (definitions, new_schema) = split_definitions(schema);
    if !convert_casing {
        return (definitions, new_schema);
    }

    let definitions = definitions
        .iter()
        .map(|(name, definition)| (name.clone(), camelize(definition)))
        .collect();
    (definitions, camelize(&new_schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn reflected() -> Value {
        json!({
            "type": "object",
            "properties": {
                "home_address": {"$ref": "#/components/schemas/Street_Address"}
            },
            "definitions": {
                "Street_Address": {
                    "type": "object",
                    "properties": {"street_name": {"type": "string"}}
                }
            }
        })
    }

    #[test]
    fn test_split_without_conversion() {
        let (definitions, schema) = split_definitions(&reflected());

        assert_eq!(definitions.len(), 1);
        assert!(definitions.contains_key("Street_Address"));
        assert!(schema.get("definitions").is_none());
        assert_eq!(
            schema["properties"]["home_address"]["$ref"],
            "#/components/schemas/Street_Address"
        );
    }

    #[test]
    fn test_split_leaves_input_untouched() {
        let input = reflected();
        let _ = split_definitions(&input);
        assert!(input.get("definitions").is_some());
    }

    #[test]
    fn test_split_without_definitions() {
        let (definitions, schema) = split_definitions(&json!({"type": "string"}));
        assert!(definitions.is_empty());
        assert_eq!(schema, json!({"type": "string"}));
    }

    #[test]
    fn test_split_convert_camelizes_both_halves() {
        let (definitions, schema) = split_convert_definitions(&reflected(), true);

        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "homeAddress": {"$ref": "#/components/schemas/Street_Address"}
                }
            })
        );
        assert_eq!(
            definitions["Street_Address"],
            json!({"type": "object", "properties": {"streetName": {"type": "string"}}})
        );
    }

    #[test]
    fn test_split_convert_disabled_matches_plain_split() {
        assert_eq!(
            split_convert_definitions(&reflected(), false),
            split_definitions(&reflected())
        );
    }
}
