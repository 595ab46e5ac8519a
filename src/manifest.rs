//! Route manifests - route tables described in YAML or JSON.
//!
//! The command-line tool has no running application to inspect, so it reads
//! the route table, the declared models and the generation options from a
//! manifest file:
//!
//! ```yaml
//! name: pets_service
//! config:
//!   info: {title: Pets, version: 1.0.0}
//!   convert_casing: true
//! models:
//!   Pet:
//!     documentation: A pet in the store.
//!     schema:
//!       type: object
//!       properties:
//!         pet_id: {type: integer}
//! routes:
//!   - rule: /pets/<int:pet_id>
//!     endpoint: get_pet
//!     methods: [GET]
//!     documentation: Fetch a pet.
//!     responses:
//!       200: {model: Pet}
//! ```

use crate::config::{SchemaConfig, SecurityRequirement};
use crate::error::{Error, Result};
use crate::model::ModelType;
use crate::route::{DataSource, Method, Route, RouteMetadata, RouteTable};
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A complete route manifest
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Application name, used as the default document title
    pub name: String,
    #[serde(default)]
    pub config: SchemaConfig,
    #[serde(default)]
    pub models: BTreeMap<String, ModelEntry>,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

/// A named model given as a precomputed JSON Schema
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub schema: Value,
    #[serde(default)]
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    pub rule: String,
    pub endpoint: String,
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
    #[serde(default)]
    pub websocket: bool,
    #[serde(default)]
    pub provide_automatic_options: Option<bool>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(default)]
    pub request: Option<RequestEntry>,
    #[serde(default)]
    pub responses: BTreeMap<u16, ResponseEntry>,
    #[serde(default)]
    pub querystring: Option<String>,
    #[serde(default)]
    pub headers: Option<String>,
}

fn default_methods() -> Vec<String> {
    vec!["GET".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestEntry {
    pub model: String,
    #[serde(default = "default_source")]
    pub source: DataSource,
}

fn default_source() -> DataSource {
    DataSource::Json
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEntry {
    pub model: String,
    #[serde(default)]
    pub headers: Option<String>,
}

impl Manifest {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Manifest(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Manifest(e.to_string()))
    }

    /// Loads a manifest, parsing `.json` files as JSON and anything else as YAML
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading route manifest: {}", path.display());
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Builds the route table, resolving model references by name
    pub fn route_table(&self) -> Result<RouteTable> {
        let models: BTreeMap<&str, ModelType> = self
            .models
            .iter()
            .map(|(name, entry)| {
                (
                    name.as_str(),
                    ModelType::from_schema(
                        name.clone(),
                        entry.schema.clone(),
                        entry.documentation.clone(),
                    ),
                )
            })
            .collect();

        let resolve = |name: &str, endpoint: &str| -> Result<ModelType> {
            models.get(name).cloned().ok_or_else(|| {
                Error::Manifest(format!(
                    "route {} references unknown model {}",
                    endpoint, name
                ))
            })
        };

        let mut table = RouteTable::new(self.name.clone());
        for entry in &self.routes {
            let methods = entry
                .methods
                .iter()
                .map(|method| {
                    method.parse::<Method>().map_err(|_| {
                        Error::Manifest(format!(
                            "route {} declares unknown method {}",
                            entry.endpoint, method
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let mut route = Route::new(entry.rule.clone(), entry.endpoint.clone()).methods(methods);
            if entry.websocket {
                route = route.websocket();
            }
            if let Some(provide) = entry.provide_automatic_options {
                route = route.provide_automatic_options(provide);
            }

            let mut metadata = RouteMetadata::new();
            if let Some(documentation) = &entry.documentation {
                metadata = metadata.documented(documentation.clone());
            }
            if let Some(tags) = &entry.tags {
                metadata = metadata.tag(tags.iter().cloned());
            }
            if entry.deprecated {
                metadata = metadata.deprecate();
            }
            if entry.hidden {
                metadata = metadata.hide();
            }
            if let Some(security) = &entry.security {
                metadata = metadata.security_scheme(security.clone());
            }
            if let Some(request) = &entry.request {
                let model = resolve(&request.model, &entry.endpoint)?;
                metadata = metadata.validate_request(model, request.source);
            }
            for (status, response) in &entry.responses {
                let model = resolve(&response.model, &entry.endpoint)?;
                metadata = match &response.headers {
                    Some(headers) => metadata.validate_response_with_headers(
                        *status,
                        model,
                        resolve(headers, &entry.endpoint)?,
                    ),
                    None => metadata.validate_response(*status, model),
                };
            }
            if let Some(querystring) = &entry.querystring {
                metadata = metadata.validate_querystring(resolve(querystring, &entry.endpoint)?);
            }
            if let Some(headers) = &entry.headers {
                metadata = metadata.validate_headers(resolve(headers, &entry.endpoint)?);
            }

            table.add_route(route, metadata);
        }

        debug!("Loaded {} routes from manifest", table.routes().len());
        Ok(table)
    }
}
