//! Coercion of model results returned by route handlers.
//!
//! Handlers may return structured models instead of plain JSON. The
//! [`CoerceModelResult`] filter sits in front of the application's response
//! builder and turns such models into JSON objects, camelizing their keys
//! when casing conversion is enabled. Plain values are forwarded unchanged.
//!
//! # Example
//!
//! ```
//! use openapi_from_routes::coercion::{CoerceModelResult, ModelValue, ResponseParts};
//! use openapi_from_routes::config::SchemaConfig;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User {
//!     user_id: u32,
//! }
//!
//! let config = SchemaConfig::new().with_convert_casing(true);
//! let filter = CoerceModelResult::new(|parts: ResponseParts| parts.body, &config);
//!
//! let model = ModelValue::record(&User { user_id: 7 }).unwrap();
//! let body = filter.make_response(model);
//! assert_eq!(body, serde_json::json!({"userId": 7}));
//! ```

use crate::casing::camelize_map;
use crate::config::SchemaConfig;
use crate::error::{Error, Result};
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Response headers as name/value pairs
pub type Headers = Vec<(String, String)>;

/// Second element of a handler's return tuple
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOrHeaders {
    Status(u16),
    Headers(Headers),
}

/// A validating model: exposes aliases for some of its fields.
pub trait ValidatedModel: Serialize {
    /// `(field name, alias)` pairs
    fn field_aliases() -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }
}

/// Structured model instance returned by a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValue {
    /// Plain attribute record: its fields map directly to keys
    Record(Map<String, Value>),
    /// Validated model with optional field aliases
    Validated {
        fields: Map<String, Value>,
        aliases: BTreeMap<String, String>,
    },
}

impl ModelValue {
    /// Captures the fields of an attribute record
    pub fn record<T: Serialize>(value: &T) -> Result<Self> {
        Ok(ModelValue::Record(fields_of(value)?))
    }

    /// Captures the fields of a validated model together with its aliases
    pub fn validated<T: ValidatedModel>(value: &T) -> Result<Self> {
        Ok(ModelValue::Validated {
            fields: fields_of(value)?,
            aliases: T::field_aliases()
                .into_iter()
                .map(|(field, alias)| (field.to_string(), alias.to_string()))
                .collect(),
        })
    }

    /// Field mapping of the model; validated models use their aliases as
    /// keys when `by_alias` is set.
    pub fn to_mapping(&self, by_alias: bool) -> Map<String, Value> {
        match self {
            ModelValue::Record(fields) => fields.clone(),
            ModelValue::Validated { fields, aliases } => fields
                .iter()
                .map(|(name, value)| {
                    let key = match aliases.get(name) {
                        Some(alias) if by_alias => alias.clone(),
                        _ => name.clone(),
                    };
                    (key, value.clone())
                })
                .collect(),
        }
    }
}

fn fields_of<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::InvalidArgument(format!(
            "model results must serialize to an object, got {}",
            other
        ))),
    }
}

/// The value part of a handler result
#[derive(Debug, Clone, PartialEq)]
pub enum ResultValue {
    Model(ModelValue),
    Plain(Value),
}

impl From<ModelValue> for ResultValue {
    fn from(model: ModelValue) -> Self {
        ResultValue::Model(model)
    }
}

impl From<Value> for ResultValue {
    fn from(value: Value) -> Self {
        ResultValue::Plain(value)
    }
}

/// What a handler returned: a value, optionally with status and headers
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerReturn {
    pub value: ResultValue,
    pub status_or_headers: Option<StatusOrHeaders>,
    pub headers: Option<Headers>,
}

impl HandlerReturn {
    pub fn new(value: impl Into<ResultValue>) -> Self {
        Self {
            value: value.into(),
            status_or_headers: None,
            headers: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status_or_headers = Some(StatusOrHeaders::Status(status));
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        match self.status_or_headers {
            None => self.status_or_headers = Some(StatusOrHeaders::Headers(headers)),
            Some(_) => self.headers = Some(headers),
        }
        self
    }
}

impl From<ResultValue> for HandlerReturn {
    fn from(value: ResultValue) -> Self {
        HandlerReturn::new(value)
    }
}

impl From<ModelValue> for HandlerReturn {
    fn from(model: ModelValue) -> Self {
        HandlerReturn::new(model)
    }
}

impl From<Value> for HandlerReturn {
    fn from(value: Value) -> Self {
        HandlerReturn::new(value)
    }
}

impl From<(ResultValue, StatusOrHeaders)> for HandlerReturn {
    fn from((value, status_or_headers): (ResultValue, StatusOrHeaders)) -> Self {
        Self {
            value,
            status_or_headers: Some(status_or_headers),
            headers: None,
        }
    }
}

impl From<(ResultValue, StatusOrHeaders, Headers)> for HandlerReturn {
    fn from((value, status_or_headers, headers): (ResultValue, StatusOrHeaders, Headers)) -> Self {
        Self {
            value,
            status_or_headers: Some(status_or_headers),
            headers: Some(headers),
        }
    }
}

/// Input of the wrapped response builder
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseParts {
    pub body: Value,
    pub status_or_headers: Option<StatusOrHeaders>,
    pub headers: Option<Headers>,
}

/// The application's response-building step.
pub trait ResponseBuilder {
    type Response;

    fn make_response(&self, parts: ResponseParts) -> Self::Response;
}

impl<F, R> ResponseBuilder for F
where
    F: Fn(ResponseParts) -> R,
{
    type Response = R;

    fn make_response(&self, parts: ResponseParts) -> R {
        self(parts)
    }
}

/// Response builder wrapper converting model results into JSON objects.
pub struct CoerceModelResult<B> {
    inner: B,
    convert_casing: bool,
    by_alias: bool,
}

impl<B: ResponseBuilder> CoerceModelResult<B> {
    pub fn new(inner: B, config: &SchemaConfig) -> Self {
        Self {
            inner,
            convert_casing: config.convert_casing,
            by_alias: config.by_alias,
        }
    }

    /// Converts a model value; plain values are returned untouched
    pub fn coerce(&self, value: ResultValue) -> Value {
        match value {
            ResultValue::Model(model) => {
                debug!("Coercing model result into a JSON object");
                let mapping = model.to_mapping(self.by_alias);
                if self.convert_casing {
                    Value::Object(camelize_map(&mapping))
                } else {
                    Value::Object(mapping)
                }
            }
            ResultValue::Plain(value) => value,
        }
    }

    /// Coerces the handler result and forwards it with its status and headers
    pub fn make_response(&self, result: impl Into<HandlerReturn>) -> B::Response {
        let HandlerReturn {
            value,
            status_or_headers,
            headers,
        } = result.into();

        self.inner.make_response(ResponseParts {
            body: self.coerce(value),
            status_or_headers,
            headers,
        })
    }
}
