//! Serialization module for converting OpenAPI documents to YAML or JSON format.
//!
//! All maps in the document are ordered, so serializing the same document
//! twice yields byte-identical output.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes an OpenAPI document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to pretty-printed JSON.
///
/// # Example
///
/// ```
/// use openapi_from_routes::config::SchemaConfig;
/// use openapi_from_routes::openapi_builder::build_openapi_schema;
/// use openapi_from_routes::route::RouteTable;
/// use openapi_from_routes::serializer::serialize_json;
///
/// let doc = build_openapi_schema(&RouteTable::new("empty"), &SchemaConfig::new()).unwrap();
/// let json = serialize_json(&doc).unwrap();
/// assert!(json.contains("\"openapi\": \"3.0.3\""));
/// ```
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// Existing files are overwritten.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Info, SchemaConfig};
    use crate::model::ModelType;
    use crate::openapi_builder::build_openapi_schema;
    use crate::route::{Method, Route, RouteMetadata, RouteTable};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn create_test_document() -> OpenApiDocument {
        let user = ModelType::from_schema(
            "User",
            json!({"type": "object", "properties": {"user_id": {"type": "integer"}}}),
            Some("A user.".to_string()),
        );
        let mut table = RouteTable::new("test_app");
        table.add_route(
            Route::new("/users/<int:user_id>", "get_user").methods([Method::Get]),
            RouteMetadata::new()
                .documented("Fetch a user.")
                .validate_response(200, user),
        );

        let config = SchemaConfig::new().with_info(Info::new("Test API", "1.0.0"));
        build_openapi_schema(&table, &config).unwrap()
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.contains("openapi:"));
        assert!(yaml.contains("title: Test API"));

        let parsed: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["openapi"], "3.0.3");
        assert_eq!(parsed["info"]["version"], "1.0.0");
        assert_eq!(
            parsed["paths"]["/users/{user_id}"]["get"]["summary"],
            "Fetch a user."
        );
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_document()).unwrap();

        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["openapi"], "3.0.3");
        assert_eq!(parsed["info"]["title"], "Test API");
        assert!(parsed["paths"]["/users/{user_id}"]["get"].is_object());
    }

    #[test]
    fn test_serialize_json_pretty_format() {
        let json = serialize_json(&create_test_document()).unwrap();

        assert!(json.contains('\n'));
        assert!(json.contains("  "));
        assert!(json.lines().count() > 5, "Pretty printed JSON should have multiple lines");
    }

    #[test]
    fn test_serialization_is_stable() {
        let first = serialize_json(&create_test_document()).unwrap();
        let second = serialize_json(&create_test_document()).unwrap();
        assert_eq!(first, second);

        let first = serialize_yaml(&create_test_document()).unwrap();
        let second = serialize_yaml(&create_test_document()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("openapi.json");

        write_to_file("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("openapi.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert!(file_path.exists());
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("openapi.yaml");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }
}
