//! Model reflection - turning model types into JSON Schema fragments.
//!
//! The generator never inspects model types itself. Each binding holds a
//! [`ModelType`] handle whose [`Reflect`] implementation produces a JSON
//! Schema object, optionally carrying its named sub-schemas under a
//! `definitions` key. All `$ref` pointers produced by reflection point into
//! [`REF_PREFIX`].
//!
//! Two reflectors are provided:
//!
//! - [`ModelType::of`] for Rust types deriving [`schemars::JsonSchema`]
//! - [`ModelType::from_schema`] for precomputed schemas, such as the ones
//!   declared in a route manifest

use crate::error::{Error, Result};
use log::debug;
use schemars::r#gen::SchemaSettings;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Prefix of every `$ref` into the shared component registry.
pub const REF_PREFIX: &str = "#/components/schemas/";

/// A model type that can describe itself as JSON Schema.
pub trait Reflect: Send + Sync {
    /// Name used in logs and error messages
    fn name(&self) -> &str;

    /// Documentation text attached to the model, if any
    fn documentation(&self) -> Option<String>;

    /// Produces the model's JSON Schema object with embedded definitions
    fn reflect(&self) -> Result<Value>;
}

/// Shared handle to a reflectable model type.
#[derive(Clone)]
pub struct ModelType(Arc<dyn Reflect>);

impl ModelType {
    /// Wraps a custom reflector
    pub fn new<R: Reflect + 'static>(reflector: R) -> Self {
        Self(Arc::new(reflector))
    }

    /// Model handle for a Rust type deriving [`JsonSchema`]
    pub fn of<T: JsonSchema + 'static>() -> Self {
        Self::new(JsonSchemaModel::<T> {
            name: T::schema_name(),
            marker: PhantomData,
        })
    }

    /// Model handle for a precomputed JSON Schema
    pub fn from_schema(
        name: impl Into<String>,
        schema: Value,
        documentation: Option<String>,
    ) -> Self {
        Self::new(StaticModel {
            name: name.into(),
            schema,
            documentation,
        })
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn documentation(&self) -> Option<String> {
        self.0.documentation()
    }

    /// Reflects the model, rejecting anything that is not a JSON object
    pub fn reflect(&self) -> Result<Value> {
        debug!("Reflecting model: {}", self.name());
        let schema = self.0.reflect()?;
        if !schema.is_object() {
            return Err(Error::reflection(
                self.name(),
                "reflected schema is not a JSON object",
            ));
        }
        Ok(schema)
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelType").field(&self.name()).finish()
    }
}

/// Reflector backed by `schemars`
struct JsonSchemaModel<T> {
    name: String,
    marker: PhantomData<fn() -> T>,
}

impl<T: JsonSchema> JsonSchemaModel<T> {
    fn root_schema() -> RootSchema {
        let mut settings = SchemaSettings::openapi3();
        settings.meta_schema = None;
        settings.definitions_path = REF_PREFIX.to_string();
        settings.into_generator().into_root_schema_for::<T>()
    }
}

impl<T: JsonSchema> Reflect for JsonSchemaModel<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn documentation(&self) -> Option<String> {
        Self::root_schema()
            .schema
            .metadata
            .and_then(|metadata| metadata.description)
    }

    fn reflect(&self) -> Result<Value> {
        serde_json::to_value(Self::root_schema())
            .map_err(|e| Error::reflection(self.name(), e.to_string()))
    }
}

/// Reflector returning a schema supplied up front
struct StaticModel {
    name: String,
    schema: Value,
    documentation: Option<String>,
}

impl Reflect for StaticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn documentation(&self) -> Option<String> {
        self.documentation.clone()
    }

    fn reflect(&self) -> Result<Value> {
        Ok(self.schema.clone())
    }
}
