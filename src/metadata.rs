//! Reading a handler's declared metadata into operation-level fields.

use crate::config::SecurityRequirement;
use crate::route::{Route, RouteMetadata};
use log::debug;

/// Converters whose placeholders hold numbers
const NUMERIC_CONVERTERS: &[&str] = &["int", "float"];

const TAB_WIDTH: usize = 8;

/// Operation-level fields derived from a route and its handler metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationMetadata {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub deprecated: bool,
    pub security: Option<Vec<SecurityRequirement>>,
    pub path_parameters: Vec<PathParameter>,
}

/// A placeholder of the route rule, documented as a required path parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParameter {
    pub name: String,
    /// JSON Schema type: `"number"` or `"string"`
    pub schema_type: &'static str,
}

/// Collects the operation metadata for `route` from its handler's record.
pub fn extract(route: &Route, metadata: &RouteMetadata) -> OperationMetadata {
    debug!("Extracting metadata for endpoint: {}", route.endpoint());

    let (summary, description) = match metadata
        .documentation
        .as_deref()
        .and_then(parse_documentation)
    {
        Some((summary, description)) => (Some(summary), Some(description)),
        None => (None, None),
    };

    OperationMetadata {
        summary,
        description,
        tags: metadata
            .tags
            .as_ref()
            .map(|tags| tags.iter().cloned().collect()),
        deprecated: metadata.deprecated,
        security: metadata.security.clone(),
        path_parameters: path_parameters(route),
    }
}

/// One required path parameter per rule placeholder, in rule order.
pub fn path_parameters(route: &Route) -> Vec<PathParameter> {
    route
        .converters()
        .into_iter()
        .map(|(name, converter)| PathParameter {
            name: name.to_string(),
            schema_type: if converter.is_some_and(is_numeric_converter) {
                "number"
            } else {
                "string"
            },
        })
        .collect()
}

pub fn is_numeric_converter(converter: &str) -> bool {
    NUMERIC_CONVERTERS.contains(&converter)
}

/// Splits documentation into `(summary, description)`.
///
/// The text is cleaned first; the first line becomes the summary and the
/// remaining lines, joined with newlines, the description. Blank
/// documentation yields `None`.
pub fn parse_documentation(documentation: &str) -> Option<(String, String)> {
    let cleaned = clean_documentation(documentation);
    let mut lines = cleaned.lines();
    let summary = lines.next()?.to_string();
    let description = lines.collect::<Vec<_>>().join("\n");
    Some((summary, description))
}

/// Normalizes indentation of documentation text.
///
/// Tabs are expanded, the first line is stripped of leading whitespace, the
/// common indentation of the remaining lines is removed, and leading and
/// trailing blank lines are dropped.
pub fn clean_documentation(documentation: &str) -> String {
    let expanded = expand_tabs(documentation);
    let mut lines: Vec<&str> = expanded.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    // Margin in chars, not bytes
    let margin = lines[1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    cleaned.push(lines.remove(0).trim_start().to_string());
    for line in lines {
        let stripped = line
            .char_indices()
            .nth(margin)
            .map_or("", |(offset, _)| &line[offset..]);
        cleaned.push(stripped.trim_end().to_string());
    }

    while cleaned.first().is_some_and(|line| line.trim().is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.trim().is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}

fn expand_tabs(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut column = 0;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let spaces = TAB_WIDTH - column % TAB_WIDTH;
                result.extend(std::iter::repeat(' ').take(spaces));
                column += spaces;
            }
            '\n' | '\r' => {
                result.push(ch);
                column = 0;
            }
            _ => {
                result.push(ch);
                column += 1;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Route;
    use std::collections::BTreeMap;

    #[test]
    fn test_single_line_documentation() {
        assert_eq!(
            parse_documentation("List every user."),
            Some(("List every user.".to_string(), String::new()))
        );
    }

    #[test]
    fn test_indented_documentation() {
        let doc = "Create a user.

            The user is stored and returned
              with its new identifier.
        ";
        let (summary, description) = parse_documentation(doc).unwrap();
        assert_eq!(summary, "Create a user.");
        assert_eq!(
            description,
            "\nThe user is stored and returned\n  with its new identifier."
        );
    }

    #[test]
    fn test_leading_blank_lines_are_dropped() {
        let doc = "\n\n    Summary line\n    Details\n";
        assert_eq!(
            parse_documentation(doc),
            Some(("Summary line".to_string(), "Details".to_string()))
        );
    }

    #[test]
    fn test_blank_documentation_is_absent() {
        assert_eq!(parse_documentation(""), None);
        assert_eq!(parse_documentation("   \n  \n"), None);
    }

    #[test]
    fn test_tabs_are_expanded() {
        assert_eq!(clean_documentation("Title\n\tBody"), "Title\nBody");
    }

    #[test]
    fn test_multibyte_indentation() {
        assert_eq!(
            parse_documentation("Summary\n a\n\u{a0}b"),
            Some(("Summary".to_string(), "a\nb".to_string()))
        );
        assert_eq!(
            clean_documentation("Title\n\u{3000}\u{3000}deep\n  shallow"),
            "Title\ndeep\nshallow"
        );
    }

    #[test]
    fn test_path_parameter_types() {
        let route = Route::new("/orgs/<org>/items/<int:id>/<float:weight>/<path:rest>", "item");
        let params = path_parameters(&route);
        let summary: Vec<_> = params
            .iter()
            .map(|p| (p.name.as_str(), p.schema_type))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("org", "string"),
                ("id", "number"),
                ("weight", "number"),
                ("rest", "string"),
            ]
        );
    }

    #[test]
    fn test_extract_copies_declared_fields() {
        let route = Route::new("/users/<int:id>", "get_user");
        let security = vec![BTreeMap::from([(
            "token".to_string(),
            vec!["read".to_string()],
        )])];
        let metadata = RouteMetadata::new()
            .documented("Fetch a user.\nBy identifier.")
            .tag(["users", "accounts"])
            .deprecate()
            .security_scheme(security.clone());

        let extracted = extract(&route, &metadata);

        assert_eq!(extracted.summary.as_deref(), Some("Fetch a user."));
        assert_eq!(extracted.description.as_deref(), Some("By identifier."));
        assert_eq!(
            extracted.tags,
            Some(vec!["accounts".to_string(), "users".to_string()])
        );
        assert!(extracted.deprecated);
        assert_eq!(extracted.security, Some(security));
        assert_eq!(extracted.path_parameters.len(), 1);
    }

    #[test]
    fn test_extract_without_documentation() {
        let route = Route::new("/health", "health");
        let extracted = extract(&route, &RouteMetadata::new());
        assert_eq!(extracted, OperationMetadata::default());
    }
}
