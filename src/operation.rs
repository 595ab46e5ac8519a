//! Building OpenAPI operations for a single route.
//!
//! [`build_path`] turns one route and its handler metadata into a paths
//! fragment (normalized path -> method -> operation) plus the component
//! schemas the route's models contributed. The document assembler merges
//! these fragments across the whole route table.

use crate::casing::to_camel_case;
use crate::definitions::split_convert_definitions;
use crate::error::{Error, Result};
use crate::metadata::{self, clean_documentation};
use crate::model::ModelType;
use crate::openapi_builder::{
    Header, MediaType, Operation, Parameter, ParameterLocation, PathItem, RequestBody, Response,
};
use crate::route::{parse_rule, DataSource, Method, Route, RouteMetadata, RuleSegment};
use log::debug;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Normalized path -> operations contributed by one route
pub type PathsFragment = BTreeMap<String, PathItem>;

/// Definition name -> schema contributed by one route
pub type ComponentsFragment = BTreeMap<String, Value>;

/// Property keys that belong on the parameter object rather than its schema
const LIFTED_STRING_KEYS: &[&str] = &["description"];
const LIFTED_BOOL_KEYS: &[&str] = &["required", "deprecated"];

/// Converts a rule into OpenAPI path syntax: `<int:id>` becomes `{id}`.
pub fn openapi_path(rule: &str) -> String {
    parse_rule(rule)
        .into_iter()
        .map(|segment| match segment {
            RuleSegment::Static(text) => text.to_string(),
            RuleSegment::Variable { name, .. } => format!("{{{}}}", name),
        })
        .collect()
}

/// Builds the operations of `route` and the component schemas they use.
///
/// The same operation is registered under every method the route answers,
/// except `HEAD` and an automatically provided `OPTIONS`.
///
/// # Errors
///
/// Returns [`Error::Reflection`] when any bound model fails to reflect.
pub fn build_path(
    route: &Route,
    metadata: &RouteMetadata,
    convert_casing: bool,
) -> Result<(PathsFragment, ComponentsFragment)> {
    debug!("Building operations for rule: {}", route.rule());

    let mut builder = OperationBuilder {
        convert_casing,
        components: ComponentsFragment::new(),
    };
    let operation = builder.operation(route, metadata)?;

    let path = openapi_path(route.rule());
    let mut path_item = PathItem::default();
    for method in route.allowed_methods() {
        if method == Method::Head
            || (method == Method::Options && route.provides_automatic_options())
        {
            continue;
        }
        debug!("Adding operation: {} {}", method, path);
        path_item.insert(method, operation.clone());
    }
    if path_item.is_empty() {
        debug!("No documented methods for rule: {}", route.rule());
    }

    let mut paths = PathsFragment::new();
    paths.insert(path, path_item);
    Ok((paths, builder.components))
}

struct OperationBuilder {
    convert_casing: bool,
    components: ComponentsFragment,
}

impl OperationBuilder {
    fn operation(&mut self, route: &Route, metadata: &RouteMetadata) -> Result<Operation> {
        let extracted = metadata::extract(route, metadata);
        let mut operation = Operation {
            summary: extracted.summary,
            description: extracted.description,
            tags: extracted.tags,
            deprecated: extracted.deprecated,
            security: extracted.security,
            ..Operation::default()
        };

        for (status, binding) in &metadata.responses {
            let schema = self.reflect(&binding.model, self.convert_casing)?;
            let mut response = Response {
                description: binding
                    .model
                    .documentation()
                    .map(|doc| clean_documentation(&doc))
                    .unwrap_or_default(),
                content: media(JSON_CONTENT_TYPE, schema),
                headers: BTreeMap::new(),
            };

            if let Some(headers_model) = &binding.headers {
                let schema = self.reflect(headers_model, false)?;
                for (name, property) in properties(headers_model, &schema)? {
                    response.headers.insert(
                        name.replace('_', "-"),
                        Header {
                            schema: property.clone(),
                        },
                    );
                }
            }
            operation.responses.insert(status.to_string(), response);
        }

        if let Some(request) = &metadata.request {
            let schema = self.reflect(&request.model, self.convert_casing)?;
            let content_type = match request.source {
                DataSource::Json => JSON_CONTENT_TYPE,
                DataSource::Form => FORM_CONTENT_TYPE,
            };
            operation.request_body = Some(RequestBody {
                content: media(content_type, schema),
            });
        }

        if let Some(querystring) = &metadata.querystring {
            let parameters =
                self.model_parameters(querystring, ParameterLocation::Query, self.convert_casing)?;
            operation.parameters.extend(parameters);
        }

        if let Some(headers) = &metadata.headers {
            let parameters = self.model_parameters(headers, ParameterLocation::Header, false)?;
            operation.parameters.extend(parameters);
        }

        for parameter in extracted.path_parameters {
            operation.parameters.push(Parameter {
                name: parameter.name,
                location: ParameterLocation::Path,
                description: None,
                required: Some(true),
                deprecated: None,
                schema: json!({ "type": parameter.schema_type }),
            });
        }

        Ok(operation)
    }

    /// Reflects `model`, registers its definitions and returns the inline schema
    fn reflect(&mut self, model: &ModelType, convert_casing: bool) -> Result<Value> {
        let reflected = model.reflect()?;
        let (definitions, schema) = split_convert_definitions(&reflected, convert_casing);
        self.components.extend(definitions);
        Ok(schema)
    }

    /// One parameter per property of `model`
    fn model_parameters(
        &mut self,
        model: &ModelType,
        location: ParameterLocation,
        convert_casing: bool,
    ) -> Result<Vec<Parameter>> {
        let schema = self.reflect(model, convert_casing)?;
        let required_fields: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut parameters = Vec::new();
        for (name, property) in properties(model, &schema)? {
            let mut property = property.clone();
            let mut description = None;
            let mut flags = BTreeMap::new();
            if let Some(object) = property.as_object_mut() {
                for key in LIFTED_STRING_KEYS {
                    if let Some(Value::String(_)) = object.get(*key) {
                        description = object
                            .remove(*key)
                            .and_then(|v| v.as_str().map(String::from));
                    }
                }
                for key in LIFTED_BOOL_KEYS {
                    if let Some(Value::Bool(flag)) = object.get(*key) {
                        flags.insert(*key, *flag);
                        object.remove(*key);
                    }
                }
            }

            let listed = required_fields
                .iter()
                .any(|field| field == name || (convert_casing && to_camel_case(field) == *name));
            let required = flags.get("required").copied().or(listed.then_some(true));

            parameters.push(Parameter {
                name: match location {
                    ParameterLocation::Header => name.replace('_', "-"),
                    _ => name.clone(),
                },
                location,
                description,
                required,
                deprecated: flags.get("deprecated").copied(),
                schema: property,
            });
        }
        Ok(parameters)
    }
}

fn media(content_type: &str, schema: Value) -> BTreeMap<String, MediaType> {
    BTreeMap::from([(content_type.to_string(), MediaType { schema })])
}

fn properties<'a>(model: &ModelType, schema: &'a Value) -> Result<&'a Map<String, Value>> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::reflection(model.name(), "schema has no properties object"))
}
