//! Generation configuration and the OpenAPI metadata objects it carries.
//!
//! Metadata types use snake_case field names, matching how they are written
//! in a manifest. The document assembler camelizes them when it places them
//! into the final document.

use log::warn;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Version used for the default [`Info`] when none is configured.
pub const DEFAULT_API_VERSION: &str = "0.1.0";

/// One security requirement: scheme name -> required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// Options threaded through document generation and result coercion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// API info; derived from the application name when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<BTreeMap<String, SecurityScheme>>,
    /// Security requirements applied to every route
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,
    /// camelCase schema bodies and coerced results
    pub convert_casing: bool,
    /// Prefer field aliases when coercing validated models
    pub by_alias: bool,
}

impl SchemaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(mut self, info: Info) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_servers(mut self, servers: Vec<Server>) -> Self {
        self.servers = Some(servers);
        self
    }

    pub fn with_security_scheme(mut self, name: impl Into<String>, scheme: SecurityScheme) -> Self {
        self.security_schemes
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), scheme);
        self
    }

    pub fn with_security(mut self, security: Vec<SecurityRequirement>) -> Self {
        self.security = Some(security);
        self
    }

    pub fn with_external_docs(mut self, external_docs: ExternalDocumentation) -> Self {
        self.external_docs = Some(external_docs);
        self
    }

    pub fn with_convert_casing(mut self, convert_casing: bool) -> Self {
        self.convert_casing = convert_casing;
        self
    }

    pub fn with_by_alias(mut self, by_alias: bool) -> Self {
        self.by_alias = by_alias;
        self
    }

    /// Configured info, or a placeholder titled after the application
    pub fn info_or_default(&self, app_name: &str) -> Info {
        self.info
            .clone()
            .unwrap_or_else(|| Info::new(app_name, DEFAULT_API_VERSION))
    }
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(alias = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// OpenAPI Tag object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(alias = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, ServerVariable>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerVariable {
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    pub default: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI External Documentation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocumentation {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Where an API key is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeySecurityScheme {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ApiKeyLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSecurityScheme {
    pub scheme: String,
    #[serde(alias = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuth2SecurityScheme {
    pub flows: OAuthFlows,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthFlows {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,
    #[serde(alias = "clientCredentials", skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,
    #[serde(alias = "authorizationCode", skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthFlow {
    #[serde(alias = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(alias = "tokenUrl", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(alias = "refreshUrl", skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenIdSecurityScheme {
    #[serde(alias = "openIdConnectUrl")]
    pub open_id_connect_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Least specific scheme shape, used for unrecognized `type` values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecuritySchemeBase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Security Scheme object, discriminated by its `type`
#[derive(Debug, Clone, PartialEq)]
pub enum SecurityScheme {
    ApiKey(ApiKeySecurityScheme),
    Http(HttpSecurityScheme),
    OAuth2(OAuth2SecurityScheme),
    OpenIdConnect(OpenIdSecurityScheme),
    Other {
        scheme_type: String,
        base: SecuritySchemeBase,
    },
}

impl SecurityScheme {
    /// The `type` discriminator written into the document
    pub fn scheme_type(&self) -> &str {
        match self {
            SecurityScheme::ApiKey(_) => "apiKey",
            SecurityScheme::Http(_) => "http",
            SecurityScheme::OAuth2(_) => "oauth2",
            SecurityScheme::OpenIdConnect(_) => "openIdConnect",
            SecurityScheme::Other { scheme_type, .. } => scheme_type,
        }
    }

    /// Bearer token scheme over HTTP authorization
    pub fn bearer(bearer_format: Option<String>) -> Self {
        SecurityScheme::Http(HttpSecurityScheme {
            scheme: "bearer".to_string(),
            bearer_format,
            description: None,
        })
    }

    /// Builds a scheme from its loose JSON form.
    ///
    /// Unrecognized discriminators fall back to the least specific shape
    /// instead of failing.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let scheme_type = match value.get("type").and_then(Value::as_str) {
            Some(scheme_type) => scheme_type.to_string(),
            None => return Err(serde_json::Error::missing_field("type")),
        };

        let scheme = match scheme_type.as_str() {
            "apiKey" => SecurityScheme::ApiKey(serde_json::from_value(value)?),
            "http" => SecurityScheme::Http(serde_json::from_value(value)?),
            "oauth2" => SecurityScheme::OAuth2(serde_json::from_value(value)?),
            "openIdConnect" => SecurityScheme::OpenIdConnect(serde_json::from_value(value)?),
            _ => {
                warn!(
                    "Unrecognized security scheme type '{}', using the generic shape",
                    scheme_type
                );
                SecurityScheme::Other {
                    scheme_type: scheme_type.clone(),
                    base: serde_json::from_value(value)?,
                }
            }
        };
        Ok(scheme)
    }
}

impl Serialize for SecurityScheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Tagged<'a, T> {
            #[serde(rename = "type")]
            scheme_type: &'a str,
            #[serde(flatten)]
            body: &'a T,
        }

        let scheme_type = self.scheme_type();
        match self {
            SecurityScheme::ApiKey(body) => Tagged { scheme_type, body }.serialize(serializer),
            SecurityScheme::Http(body) => Tagged { scheme_type, body }.serialize(serializer),
            SecurityScheme::OAuth2(body) => Tagged { scheme_type, body }.serialize(serializer),
            SecurityScheme::OpenIdConnect(body) => {
                Tagged { scheme_type, body }.serialize(serializer)
            }
            SecurityScheme::Other { base, .. } => Tagged {
                scheme_type,
                body: base,
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SecurityScheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SecurityScheme::from_value(value).map_err(D::Error::custom)
    }
}
