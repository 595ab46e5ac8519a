//! Key casing normalization for JSON structures.
//!
//! OpenAPI metadata objects always use camelCase keys, and schema bodies use
//! them too when casing conversion is enabled. These helpers rewrite
//! snake_case object keys into camelCase while leaving every value untouched.

use serde_json::{Map, Value};

/// Converts a single snake_case (or kebab-case) name into camelCase.
///
/// A run of `_` or `-` between two characters is dropped and the character
/// after it is uppercased. Separators at either edge are preserved, so
/// private-looking names such as `_links` survive unchanged. The first
/// character is lowercased unless the name opens with two uppercase
/// characters, and all-uppercase or numeric names are returned as-is.
///
/// # Example
///
/// ```
/// use openapi_from_routes::casing::to_camel_case;
///
/// assert_eq!(to_camel_case("user_id"), "userId");
/// assert_eq!(to_camel_case("UserName"), "userName");
/// assert_eq!(to_camel_case("API_KEY"), "API_KEY");
/// assert_eq!(to_camel_case("_private_value"), "_privateValue");
/// assert_eq!(to_camel_case("$ref"), "$ref");
/// ```
pub fn to_camel_case(name: &str) -> String {
    if is_upper(name) || is_numeric(name) {
        return name.to_string();
    }

    let mut chars: Vec<char> = name.chars().collect();
    let prefix: String = chars.iter().take(2).collect();
    if !chars.is_empty() && !is_upper(&prefix) {
        let lowered: Vec<char> = chars[0].to_lowercase().collect();
        chars.splice(0..1, lowered);
    }

    let mut result = String::with_capacity(name.len());
    let mut index = 0;
    while index < chars.len() {
        let current = chars[index];
        if is_separator(current) && index > 0 && !is_separator(chars[index - 1]) {
            let run_end = index + chars[index..].iter().take_while(|c| is_separator(**c)).count();
            match chars.get(run_end) {
                Some(next) => {
                    result.extend(next.to_uppercase());
                    index = run_end + 1;
                }
                None => {
                    result.extend(&chars[index..]);
                    index = run_end;
                }
            }
            continue;
        }
        result.push(current);
        index += 1;
    }
    result
}

fn is_separator(c: char) -> bool {
    c == '_' || c == '-'
}

/// At least one cased character, and no lowercase ones
fn is_upper(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_numeric)
}

/// Recursively rewrites every object key of `value` into camelCase.
///
/// Arrays and nested objects keep their shape; strings, numbers, booleans
/// and nulls are copied verbatim. String *values* are never converted, so
/// for example the entries of a schema's `required` array keep their
/// snake_case spelling.
pub fn camelize(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(camelize_map(map)),
        Value::Array(items) => Value::Array(items.iter().map(camelize).collect()),
        other => other.clone(),
    }
}

/// Object-level variant of [`camelize`].
pub fn camelize_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (to_camel_case(key), camelize(value)))
        .collect()
}
