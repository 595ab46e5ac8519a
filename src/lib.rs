//! openapi-from-routes - OpenAPI documents from a declared route table.
//!
//! Handlers declare their contract (request, response, query-string and
//! header models, documentation, tags, security) as metadata next to the
//! route table. This library reflects those models into JSON Schemas and
//! assembles an OpenAPI 3 document from them, optionally converting schema
//! keys to camelCase. It also provides a response filter that turns model
//! results returned by handlers into JSON objects.
//!
//! # Architecture
//!
//! 1. [`route`] - Routes, handler metadata and the route table
//! 2. [`model`] - Models that reflect into JSON Schemas
//! 3. [`casing`] - snake_case to camelCase conversion of schema keys
//! 4. [`definitions`] - Lifting nested definitions out of reflected schemas
//! 5. [`metadata`] - Summary, description and path parameters of an operation
//! 6. [`operation`] - Operations and components contributed by one route
//! 7. [`openapi_builder`] - Constructs the complete OpenAPI document
//! 8. [`config`] - Document metadata and generation options
//! 9. [`coercion`] - Conversion of model results into JSON objects
//! 10. [`manifest`] - Route tables loaded from YAML or JSON files
//! 11. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_routes::{
//!     config::{Info, SchemaConfig},
//!     model::ModelType,
//!     openapi_builder::build_openapi_schema,
//!     route::{Method, Route, RouteMetadata, RouteTable},
//!     serializer::serialize_json,
//! };
//! use schemars::JsonSchema;
//!
//! /// A registered user.
//! #[derive(JsonSchema)]
//! struct User {
//!     user_id: u64,
//!     display_name: String,
//! }
//!
//! let mut table = RouteTable::new("accounts");
//! table.add_route(
//!     Route::new("/users/<int:user_id>", "get_user").methods([Method::Get]),
//!     RouteMetadata::new()
//!         .documented("Fetch a user.")
//!         .tag(["users"])
//!         .validate_response(200, ModelType::of::<User>()),
//! );
//!
//! let config = SchemaConfig::new()
//!     .with_info(Info::new("Accounts", "1.0.0"))
//!     .with_convert_casing(true);
//! let document = build_openapi_schema(&table, &config).unwrap();
//!
//! let operation = document.paths["/users/{user_id}"].get.as_ref().unwrap();
//! assert_eq!(operation.summary.as_deref(), Some("Fetch a user."));
//!
//! let json = serialize_json(&document).unwrap();
//! assert!(json.contains("displayName"));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module, which generates a document
//! from a route manifest.

pub mod casing;
pub mod cli;
pub mod coercion;
pub mod config;
pub mod definitions;
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod model;
pub mod openapi_builder;
pub mod operation;
pub mod route;
pub mod serializer;
