use crate::casing::camelize;
use crate::config::{SchemaConfig, SecurityRequirement};
use crate::error::Result;
use crate::operation::{build_path, ComponentsFragment, PathsFragment};
use crate::route::{Method, Route, RouteMetadata, RouteTable};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// OpenAPI version written into every document
pub const OPENAPI_VERSION: &str = "3.0.3";

/// OpenAPI document builder
///
/// Accumulates the operations and component schemas of every route added to
/// it, then wraps them with the configured document metadata.
pub struct OpenApiBuilder<'a> {
    /// Generation options and document metadata
    config: &'a SchemaConfig,
    /// Application name, used for the default info title
    app_name: String,
    /// Paths collection (URL path -> PathItem)
    paths: BTreeMap<String, PathItem>,
    /// Shared component schemas
    schemas: ComponentsFragment,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    /// Sets the operation for `method`, replacing any previous one
    pub fn insert(&mut self, method: Method, operation: Operation) {
        let slot = match method {
            Method::Get => &mut self.get,
            Method::Post => &mut self.post,
            Method::Put => &mut self.put,
            Method::Delete => &mut self.delete,
            Method::Patch => &mut self.patch,
            Method::Options => &mut self.options,
            Method::Head => &mut self.head,
        };
        *slot = Some(operation);
    }

    /// Method-wise union; operations of `other` win
    pub fn merge(&mut self, other: PathItem) {
        let PathItem {
            get,
            post,
            put,
            delete,
            patch,
            options,
            head,
        } = other;
        for (method, operation) in [
            (Method::Get, get),
            (Method::Post, post),
            (Method::Put, put),
            (Method::Delete, delete),
            (Method::Patch, patch),
            (Method::Options, options),
            (Method::Head, head),
        ] {
            if let Some(operation) = operation {
                self.insert(method, operation);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == PathItem::default()
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Parameters (query, header, path)
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// The location of an operation parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header)
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    /// Parameter schema
    pub schema: Value,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Content types and their schemas
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    pub schema: Value,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response content
    pub content: BTreeMap<String, MediaType>,
    /// Response headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Header>,
}

/// OpenAPI Header object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub schema: Value,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Schema definitions
    pub schemas: BTreeMap<String, Value>,
    #[serde(rename = "securitySchemes", skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<BTreeMap<String, Value>>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Value,
    /// Components (schemas, security schemes)
    pub components: Components,
    /// API paths
    pub paths: BTreeMap<String, PathItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Value>,
}

impl<'a> OpenApiBuilder<'a> {
    /// Create a new builder for the application called `app_name`
    pub fn new(config: &'a SchemaConfig, app_name: impl Into<String>) -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            config,
            app_name: app_name.into(),
            paths: BTreeMap::new(),
            schemas: ComponentsFragment::new(),
        }
    }

    /// Add a route to the OpenAPI document
    ///
    /// Operations already registered under the same path are kept unless
    /// this route defines the same method.
    pub fn add_route(&mut self, route: &Route, metadata: &RouteMetadata) -> Result<()> {
        debug!("Adding route: {} -> {}", route.rule(), route.endpoint());
        let (paths, components) = build_path(route, metadata, self.config.convert_casing)?;
        self.merge(paths, components);
        Ok(())
    }

    fn merge(&mut self, paths: PathsFragment, components: ComponentsFragment) {
        for (path, item) in paths {
            self.paths.entry(path).or_default().merge(item);
        }
        self.schemas.extend(components);
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> Result<OpenApiDocument> {
        debug!("Building final OpenAPI document");
        let config = self.config;

        let security_schemes = match &config.security_schemes {
            Some(schemes) => Some(
                schemes
                    .iter()
                    .map(|(name, scheme)| Ok((name.clone(), camelized(scheme)?)))
                    .collect::<Result<BTreeMap<_, _>>>()?,
            ),
            None => None,
        };

        Ok(OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: camelized(&config.info_or_default(&self.app_name))?,
            components: Components {
                schemas: self.schemas,
                security_schemes,
            },
            paths: self.paths,
            tags: config.tags.as_deref().map(camelized_all).transpose()?,
            servers: config.servers.as_deref().map(camelized_all).transpose()?,
            security: config.security.clone(),
            external_docs: config.external_docs.as_ref().map(camelized).transpose()?,
        })
    }
}

fn camelized<T: Serialize>(value: &T) -> Result<Value> {
    Ok(camelize(&serde_json::to_value(value)?))
}

fn camelized_all<T: Serialize>(values: &[T]) -> Result<Vec<Value>> {
    values.iter().map(camelized).collect()
}

/// Generates the OpenAPI document for every route in `table`.
///
/// Websocket routes and routes of hidden handlers are skipped. The document
/// is rebuilt from scratch on every call.
///
/// # Errors
///
/// Fails as soon as any route's models fail to reflect; no partial document
/// is returned.
pub fn build_openapi_schema(table: &RouteTable, config: &SchemaConfig) -> Result<OpenApiDocument> {
    let mut builder = OpenApiBuilder::new(config, table.name());

    for route in table.routes() {
        if route.is_websocket() {
            debug!("Skipping websocket route: {}", route.rule());
            continue;
        }

        let Some(metadata) = table.handler(route.endpoint()) else {
            warn!(
                "Skipping route {}: no handler registered for endpoint {}",
                route.rule(),
                route.endpoint()
            );
            continue;
        };
        if metadata.hidden {
            debug!("Skipping hidden route: {}", route.rule());
            continue;
        }

        builder.add_route(route, metadata)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExternalDocumentation, Info, SecurityScheme, Server, Tag};
    use crate::model::ModelType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn user_model() -> ModelType {
        ModelType::from_schema(
            "User",
            json!({
                "type": "object",
                "properties": {"user_id": {"type": "integer"}, "is_active": {"type": "boolean"}}
            }),
            None,
        )
    }

    #[test]
    fn test_new_builder_defaults_info_to_app_name() {
        let config = SchemaConfig::new();
        let document = OpenApiBuilder::new(&config, "pets").build().unwrap();

        assert_eq!(document.openapi, "3.0.3");
        assert_eq!(document.info, json!({"title": "pets", "version": "0.1.0"}));
        assert!(document.paths.is_empty());
        assert!(document.components.schemas.is_empty());
        assert!(document.components.security_schemes.is_none());
        assert!(document.tags.is_none());
        assert!(document.servers.is_none());
        assert!(document.security.is_none());
        assert!(document.external_docs.is_none());
    }

    #[test]
    fn test_add_multiple_routes_same_path() {
        let config = SchemaConfig::new();
        let mut builder = OpenApiBuilder::new(&config, "app");

        builder
            .add_route(
                &Route::new("/users", "list_users"),
                &RouteMetadata::new().documented("List users."),
            )
            .unwrap();
        builder
            .add_route(
                &Route::new("/users", "create_user").methods([Method::Post]),
                &RouteMetadata::new().documented("Create a user."),
            )
            .unwrap();

        let document = builder.build().unwrap();
        assert_eq!(document.paths.len(), 1);

        let path_item = &document.paths["/users"];
        assert_eq!(
            path_item.get.as_ref().unwrap().summary.as_deref(),
            Some("List users.")
        );
        assert_eq!(
            path_item.post.as_ref().unwrap().summary.as_deref(),
            Some("Create a user.")
        );
    }

    #[test]
    fn test_later_route_wins_for_same_method() {
        let config = SchemaConfig::new();
        let mut builder = OpenApiBuilder::new(&config, "app");
        builder
            .add_route(&Route::new("/a", "first"), &RouteMetadata::new().documented("First"))
            .unwrap();
        builder
            .add_route(&Route::new("/a", "second"), &RouteMetadata::new().documented("Second"))
            .unwrap();

        let document = builder.build().unwrap();
        assert_eq!(
            document.paths["/a"].get.as_ref().unwrap().summary.as_deref(),
            Some("Second")
        );
    }

    #[test]
    fn test_metadata_is_camelized() {
        let mut info = Info::new("Pets", "1.0.0");
        info.terms_of_service = Some("https://example.com/tos".to_string());
        let config = SchemaConfig::new()
            .with_info(info)
            .with_tags(vec![Tag {
                name: "pets".to_string(),
                description: None,
                external_docs: Some(ExternalDocumentation {
                    url: "https://example.com/pets".to_string(),
                    description: None,
                }),
            }])
            .with_servers(vec![Server {
                url: "https://api.example.com".to_string(),
                description: Some("production".to_string()),
                variables: None,
            }])
            .with_security_scheme("token", SecurityScheme::bearer(Some("JWT".to_string())))
            .with_security(vec![BTreeMap::from([("token".to_string(), vec![])])])
            .with_external_docs(ExternalDocumentation {
                url: "https://example.com/docs".to_string(),
                description: Some("Guides".to_string()),
            });

        let document = OpenApiBuilder::new(&config, "app").build().unwrap();

        assert_eq!(document.info["termsOfService"], "https://example.com/tos");
        assert_eq!(
            document.tags.unwrap()[0]["externalDocs"]["url"],
            "https://example.com/pets"
        );
        assert_eq!(document.servers.unwrap()[0]["description"], "production");
        assert_eq!(
            document.components.security_schemes.unwrap()["token"],
            json!({"type": "http", "scheme": "bearer", "bearerFormat": "JWT"})
        );
        assert_eq!(document.security.unwrap().len(), 1);
        assert_eq!(
            document.external_docs.unwrap(),
            json!({"url": "https://example.com/docs", "description": "Guides"})
        );
    }

    #[test]
    fn test_build_openapi_schema_skips_hidden_and_websocket() {
        let mut table = RouteTable::new("app");
        table
            .add_route(
                Route::new("/users", "users"),
                RouteMetadata::new().validate_response(200, user_model()),
            )
            .add_route(Route::new("/internal", "internal"), RouteMetadata::new().hide())
            .add_route(Route::new("/ws", "ws").websocket(), RouteMetadata::new());
        table.add_rule(Route::new("/orphan", "unregistered"));

        let document = build_openapi_schema(&table, &SchemaConfig::new()).unwrap();

        let paths: Vec<_> = document.paths.keys().cloned().collect();
        assert_eq!(paths, vec!["/users".to_string()]);
    }

    #[test]
    fn test_build_openapi_schema_fails_fast() {
        let mut table = RouteTable::new("app");
        table.add_route(
            Route::new("/broken", "broken"),
            RouteMetadata::new().validate_response(
                200,
                ModelType::from_schema("Broken", json!("nope"), None),
            ),
        );

        assert!(build_openapi_schema(&table, &SchemaConfig::new()).is_err());
    }

    #[test]
    fn test_serialized_operation_shape() {
        let mut table = RouteTable::new("app");
        table.add_route(
            Route::new("/users/<int:id>", "get_user"),
            RouteMetadata::new()
                .documented("Fetch a user.")
                .deprecate()
                .validate_response(200, user_model()),
        );

        let document = build_openapi_schema(&table, &SchemaConfig::new()).unwrap();
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(
            value["paths"]["/users/{id}"]["get"],
            json!({
                "summary": "Fetch a user.",
                "description": "",
                "deprecated": true,
                "parameters": [
                    {"name": "id", "in": "path", "required": true, "schema": {"type": "number"}}
                ],
                "responses": {
                    "200": {
                        "description": "",
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "user_id": {"type": "integer"},
                                        "is_active": {"type": "boolean"}
                                    }
                                }
                            }
                        }
                    }
                }
            })
        );
        assert_eq!(value["components"], json!({"schemas": {}}));
    }

    #[test]
    fn test_path_item_merge_and_is_empty() {
        let mut item = PathItem::default();
        assert!(item.is_empty());

        let mut other = PathItem::default();
        other.insert(Method::Delete, Operation::default());
        item.merge(other);

        assert!(item.delete.is_some());
        assert!(!item.is_empty());
    }
}
