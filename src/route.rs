//! Route table and the declarative metadata attached to route handlers.
//!
//! A [`RouteTable`] plays the part of the host application's URL map: it
//! holds the registered [`Route`] rules in registration order and, per
//! endpoint, the [`RouteMetadata`] record declared for that handler. The
//! metadata record is built once at registration time and only read
//! afterwards.
//!
//! # Example
//!
//! ```
//! use openapi_from_routes::route::{DataSource, Method, Route, RouteMetadata, RouteTable};
//! use openapi_from_routes::model::ModelType;
//! use serde_json::json;
//!
//! let user = ModelType::from_schema("User", json!({"type": "object", "properties": {}}), None);
//!
//! let mut table = RouteTable::new("users_app");
//! table.add_route(
//!     Route::new("/users/<int:id>", "get_user").methods([Method::Get]),
//!     RouteMetadata::new()
//!         .documented("Fetch a user.")
//!         .tag(["users"])
//!         .validate_response(200, user.clone()),
//! );
//! table.add_route(
//!     Route::new("/users", "create_user").methods([Method::Post]),
//!     RouteMetadata::new().validate_request(user, DataSource::Json),
//! );
//! assert_eq!(table.routes().len(), 2);
//! ```

use crate::config::SecurityRequirement;
use crate::error::Error;
use crate::model::ModelType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// HTTP methods a route can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "OPTIONS" => Ok(Method::Options),
            "HEAD" => Ok(Method::Head),
            _ => Err(Error::InvalidArgument(format!("Unknown HTTP method: {}", s))),
        }
    }
}

/// One piece of a route rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSegment<'a> {
    /// Literal text
    Static(&'a str),
    /// A `<[converter:]name>` placeholder
    Variable {
        converter: Option<&'a str>,
        name: &'a str,
    },
}

/// Splits a rule such as `/users/<int:id>/posts/<slug>` into segments.
///
/// Converter arguments (`<int(min=1):id>`) are stripped from the converter
/// name. An unterminated `<` is kept as literal text.
pub fn parse_rule(rule: &str) -> Vec<RuleSegment<'_>> {
    let mut segments = Vec::new();
    let mut rest = rule;

    while let Some(start) = rest.find('<') {
        let Some(length) = rest[start..].find('>') else {
            break;
        };
        if start > 0 {
            segments.push(RuleSegment::Static(&rest[..start]));
        }

        let inner = &rest[start + 1..start + length];
        let segment = match inner.split_once(':') {
            Some((converter, name)) => {
                let converter = converter.split('(').next().unwrap_or(converter).trim();
                RuleSegment::Variable {
                    converter: Some(converter),
                    name: name.trim(),
                }
            }
            None => RuleSegment::Variable {
                converter: None,
                name: inner.trim(),
            },
        };
        segments.push(segment);
        rest = &rest[start + length + 1..];
    }

    if !rest.is_empty() {
        segments.push(RuleSegment::Static(rest));
    }
    segments
}

/// A URL rule bound to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    rule: String,
    endpoint: String,
    methods: BTreeSet<Method>,
    websocket: bool,
    provide_automatic_options: Option<bool>,
}

impl Route {
    /// A `GET` route for `rule` handled by `endpoint`
    pub fn new(rule: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            endpoint: endpoint.into(),
            methods: BTreeSet::from([Method::Get]),
            websocket: false,
            provide_automatic_options: None,
        }
    }

    /// Replaces the declared methods
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Marks the route as a websocket endpoint
    pub fn websocket(mut self) -> Self {
        self.websocket = true;
        self
    }

    /// Overrides whether `OPTIONS` is answered automatically
    pub fn provide_automatic_options(mut self, provide: bool) -> Self {
        self.provide_automatic_options = Some(provide);
        self
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_websocket(&self) -> bool {
        self.websocket
    }

    /// Automatic options default on unless `OPTIONS` was declared explicitly
    pub fn provides_automatic_options(&self) -> bool {
        self.provide_automatic_options
            .unwrap_or(!self.methods.contains(&Method::Options))
    }

    /// Every method the route answers, including the implicit `HEAD` for
    /// `GET` routes and the automatic `OPTIONS`.
    pub fn allowed_methods(&self) -> BTreeSet<Method> {
        let mut methods = self.methods.clone();
        if methods.contains(&Method::Get) {
            methods.insert(Method::Head);
        }
        if self.provides_automatic_options() {
            methods.insert(Method::Options);
        }
        methods
    }

    /// Placeholders of the rule as `(name, converter)` pairs, in rule order
    pub fn converters(&self) -> Vec<(&str, Option<&str>)> {
        parse_rule(&self.rule)
            .into_iter()
            .filter_map(|segment| match segment {
                RuleSegment::Variable { converter, name } => Some((name, converter)),
                RuleSegment::Static(_) => None,
            })
            .collect()
    }
}

/// Where a request body is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Json,
    Form,
}

/// Request body binding
#[derive(Debug, Clone)]
pub struct RequestBinding {
    pub model: ModelType,
    pub source: DataSource,
}

/// Response binding for one status code
#[derive(Debug, Clone)]
pub struct ResponseBinding {
    pub model: ModelType,
    /// Model describing the response headers
    pub headers: Option<ModelType>,
}

/// Declarative metadata attached to a route handler.
#[derive(Debug, Clone, Default)]
pub struct RouteMetadata {
    /// Handler documentation; first line is the summary
    pub documentation: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub deprecated: bool,
    pub security: Option<Vec<SecurityRequirement>>,
    /// Hidden handlers are left out of the document
    pub hidden: bool,
    pub request: Option<RequestBinding>,
    pub responses: BTreeMap<u16, ResponseBinding>,
    pub querystring: Option<ModelType>,
    pub headers: Option<ModelType>,
}

impl RouteMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documented(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn tag<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn deprecate(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn security_scheme(mut self, schemes: Vec<SecurityRequirement>) -> Self {
        self.security = Some(schemes);
        self
    }

    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn validate_request(mut self, model: ModelType, source: DataSource) -> Self {
        self.request = Some(RequestBinding { model, source });
        self
    }

    pub fn validate_response(mut self, status: u16, model: ModelType) -> Self {
        self.responses.insert(
            status,
            ResponseBinding {
                model,
                headers: None,
            },
        );
        self
    }

    pub fn validate_response_with_headers(
        mut self,
        status: u16,
        model: ModelType,
        headers: ModelType,
    ) -> Self {
        self.responses.insert(
            status,
            ResponseBinding {
                model,
                headers: Some(headers),
            },
        );
        self
    }

    pub fn validate_querystring(mut self, model: ModelType) -> Self {
        self.querystring = Some(model);
        self
    }

    pub fn validate_headers(mut self, model: ModelType) -> Self {
        self.headers = Some(model);
        self
    }
}

/// Registered routes and the metadata of their handlers.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    name: String,
    routes: Vec<Route>,
    handlers: HashMap<String, RouteMetadata>,
}

impl RouteTable {
    /// An empty table for the application called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Registers `route` and the metadata of its handler.
    ///
    /// Metadata registered earlier for the same endpoint is replaced.
    pub fn add_route(&mut self, route: Route, metadata: RouteMetadata) -> &mut Self {
        self.handlers.insert(route.endpoint().to_string(), metadata);
        self.routes.push(route);
        self
    }

    /// Registers an additional rule for an endpoint that already has a handler
    pub fn add_rule(&mut self, route: Route) -> &mut Self {
        self.routes.push(route);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Routes in registration order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn handler(&self, endpoint: &str) -> Option<&RouteMetadata> {
        self.handlers.get(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule_segments() {
        let segments = parse_rule("/users/<int:id>/posts/<slug>");
        assert_eq!(
            segments,
            vec![
                RuleSegment::Static("/users/"),
                RuleSegment::Variable {
                    converter: Some("int"),
                    name: "id"
                },
                RuleSegment::Static("/posts/"),
                RuleSegment::Variable {
                    converter: None,
                    name: "slug"
                },
            ]
        );
    }

    #[test]
    fn test_parse_rule_strips_converter_arguments() {
        let segments = parse_rule("/files/<int(min=1):page>.json");
        assert_eq!(
            segments,
            vec![
                RuleSegment::Static("/files/"),
                RuleSegment::Variable {
                    converter: Some("int"),
                    name: "page"
                },
                RuleSegment::Static(".json"),
            ]
        );
    }

    #[test]
    fn test_parse_rule_unterminated_placeholder() {
        assert_eq!(parse_rule("/broken/<id"), vec![RuleSegment::Static("/broken/<id")]);
    }

    #[test]
    fn test_get_route_gets_head_and_options() {
        let route = Route::new("/users", "list_users");
        let methods: Vec<_> = route.allowed_methods().into_iter().collect();
        assert_eq!(methods, vec![Method::Get, Method::Options, Method::Head]);
    }

    #[test]
    fn test_explicit_options_disables_automatic_options() {
        let route = Route::new("/cors", "cors").methods([Method::Options]);
        assert!(!route.provides_automatic_options());

        let route = Route::new("/plain", "plain")
            .methods([Method::Post])
            .provide_automatic_options(false);
        assert_eq!(
            route.allowed_methods().into_iter().collect::<Vec<_>>(),
            vec![Method::Post]
        );
    }

    #[test]
    fn test_converters_in_rule_order() {
        let route = Route::new("/<string:org>/<int:id>", "item");
        assert_eq!(
            route.converters(),
            vec![("org", Some("string")), ("id", Some("int"))]
        );
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("PATCH".parse::<Method>().unwrap(), Method::Patch);
        assert!("BREW".parse::<Method>().is_err());
    }

    #[test]
    fn test_table_keeps_registration_order_and_metadata() {
        let mut table = RouteTable::new("app");
        table
            .add_route(Route::new("/b", "b"), RouteMetadata::new().hide())
            .add_route(Route::new("/a", "a"), RouteMetadata::new().deprecate());
        table.add_rule(Route::new("/a/alias", "a"));

        let rules: Vec<_> = table.routes().iter().map(Route::rule).collect();
        assert_eq!(rules, vec!["/b", "/a", "/a/alias"]);
        assert!(table.handler("b").unwrap().hidden);
        assert!(table.handler("a").unwrap().deprecated);
        assert!(table.handler("missing").is_none());
    }

    #[test]
    fn test_metadata_tags_are_deduplicated() {
        let metadata = RouteMetadata::new().tag(["users", "admin", "users"]);
        let tags: Vec<_> = metadata.tags.unwrap().into_iter().collect();
        assert_eq!(tags, vec!["admin", "users"]);
    }
}
