use crate::catalog::{add_default_responses, global_parameters, global_responses};
use crate::extractor::{HttpMethod, RouteCategory, RouteDescriptor};
use crate::host::{ActionDocs, SwaggerConfig};
use crate::schema_generator::Schema;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Swagger version written into every document
pub const SWAGGER_VERSION: &str = "2.0";

/// Swagger document builder
pub struct OpenApiBuilder {
    /// Paths collection (URL path -> PathItem)
    paths: IndexMap<String, PathItem>,
    /// Number of operations added, overwritten ones included
    operations: usize,
}

/// Swagger Info object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// Contact information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// License information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Tag used to group operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "externalDocs", default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

impl Tag {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            external_docs: None,
        }
    }
}

/// External documentation link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Security scheme (basic, apiKey or oauth2)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(rename = "authorizationUrl", default, skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(rename = "tokenUrl", default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<IndexMap<String, String>>,
}

/// Swagger PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
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
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
        }
    }
}

/// Swagger Operation object - represents a single API operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Parameters (path, query, body), inline or `$ref`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterRef>,
    /// Responses keyed by status code or "default"
    pub responses: IndexMap<String, ResponseRef>,
    #[serde(default)]
    pub deprecated: bool,
}

/// Swagger Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header, body)
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Body schema, only for `in: body`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// The location of a parameter in an HTTP request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterLocation {
    #[serde(rename = "path")]
    Path,
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "header")]
    Header,
    #[serde(rename = "body")]
    Body,
    #[serde(rename = "formData")]
    FormData,
}

impl Parameter {
    /// Non-body parameter typed from a schema's `type`/`format`/`items`
    pub fn typed(name: &str, location: ParameterLocation, required: bool, schema: Schema) -> Self {
        Self {
            name: name.to_string(),
            location,
            description: None,
            required: required || location == ParameterLocation::Path,
            param_type: schema.schema_type,
            format: schema.format,
            items: schema.items.map(|items| *items),
            default: schema.default,
            schema: None,
        }
    }

    /// Required `in: body` parameter
    pub fn body(name: &str, schema: Schema) -> Self {
        Self {
            name: name.to_string(),
            location: ParameterLocation::Body,
            description: None,
            required: true,
            param_type: None,
            format: None,
            items: None,
            default: None,
            schema: Some(schema),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Parameter given inline or as a `$ref` into `#/parameters`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterRef {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Inline(Parameter),
}

/// Swagger Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response body schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Response {
    pub fn new(description: &str, schema: Option<Schema>) -> Self {
        Self {
            description: description.to_string(),
            schema,
        }
    }
}

/// Response given inline or as a `$ref` into `#/responses`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseRef {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Inline(Response),
}

/// Complete Swagger 2.0 document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwaggerDocument {
    /// Swagger version
    pub swagger: String,
    /// API info
    pub info: Info,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(rename = "basePath", default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    /// API paths
    pub paths: IndexMap<String, PathItem>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(rename = "securityDefinitions", default, skip_serializing_if = "Option::is_none")]
    pub security_definitions: Option<IndexMap<String, SecurityScheme>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<IndexMap<String, Vec<String>>>>,
    #[serde(rename = "externalDocs", default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

impl OpenApiBuilder {
    /// Create a new, empty OpenApiBuilder
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            paths: IndexMap::new(),
            operations: 0,
        }
    }

    /// Add a route to the document, if its category produces an operation
    pub fn add_route(&mut self, route: &RouteDescriptor) {
        let operation = match &route.category {
            RouteCategory::Manual { target } => {
                debug!(
                    "Manual route {} {} -> {} is not documented",
                    route.method.as_str(),
                    route.path,
                    target
                );
                return;
            }
            RouteCategory::Action {
                controller_id,
                action_name,
                controller_name,
                docs,
            } => match docs {
                Some(docs) => Self::action_operation(docs, controller_name),
                None => {
                    debug!(
                        "Action {}.{} has no documentation, skipping",
                        controller_id, action_name
                    );
                    return;
                }
            },
            RouteCategory::Rest => match Self::rest_operation(route) {
                Some(operation) => operation,
                None => {
                    warn!(
                        "Route {} {} is missing summary, operationId or responses, skipping",
                        route.method.as_str(),
                        route.path
                    );
                    return;
                }
            },
        };

        debug!("Adding route: {} {}", route.method.as_str(), route.path);
        self.insert(&route.path, route.method, operation);
    }

    /// Operation for a documented custom action
    fn action_operation(docs: &ActionDocs, controller_name: &str) -> Operation {
        let tags = match &docs.tags {
            Some(tags) => tags.clone(),
            None => vec![controller_name.to_string()],
        };

        let mut responses = docs.responses.clone();
        if responses.is_empty() {
            responses.insert(
                "200".to_string(),
                ResponseRef::Inline(Response::new("Successful response", None)),
            );
        }
        if docs.default_responses {
            responses = add_default_responses(&responses);
        }

        Operation {
            tags,
            summary: docs.summary.clone(),
            description: docs.description.clone(),
            operation_id: docs.operation_id.clone(),
            parameters: docs.parameters.clone(),
            responses,
            deprecated: docs.deprecated,
        }
    }

    /// Operation for a REST descriptor, `None` when its documentation is incomplete
    fn rest_operation(route: &RouteDescriptor) -> Option<Operation> {
        if route.summary.is_none() || route.operation_id.is_none() || route.responses.is_empty() {
            return None;
        }

        Some(Operation {
            tags: route.tags.clone(),
            summary: route.summary.clone(),
            description: route.description.clone(),
            operation_id: route.operation_id.clone(),
            parameters: route.parameters.clone(),
            responses: route.responses.clone(),
            deprecated: false,
        })
    }

    fn insert(&mut self, path: &str, method: HttpMethod, operation: Operation) {
        let openapi_path = Self::convert_path_format(path);
        let path_item = self.paths.entry(openapi_path.clone()).or_default();
        let slot = path_item.slot(method);
        if slot.is_some() {
            debug!(
                "Overwriting existing operation {} {}",
                method.as_str(),
                openapi_path
            );
        }
        *slot = Some(operation);
        self.operations += 1;
    }

    /// Convert path format from :param or {param} to Swagger {param} format
    fn convert_path_format(path: &str) -> String {
        path.split('/')
            .map(|part| match part.strip_prefix(':') {
                Some(name) => format!("{{{}}}", name),
                None => part.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Number of operations added so far
    pub fn operation_count(&self) -> usize {
        self.operations
    }

    /// Build the final Swagger document
    pub fn build(
        self,
        config: &SwaggerConfig,
        definitions: IndexMap<String, Schema>,
        tags: Vec<Tag>,
    ) -> SwaggerDocument {
        debug!(
            "Building final Swagger document with {} paths and {} definitions",
            self.paths.len(),
            definitions.len()
        );

        SwaggerDocument {
            swagger: SWAGGER_VERSION.to_string(),
            info: Info {
                title: config.title.clone(),
                version: config.version.clone(),
                description: config.description.clone(),
                terms_of_service: config.terms_of_service.clone(),
                contact: config.contact.clone(),
                license: config.license.clone(),
            },
            host: config.host.clone(),
            base_path: config.base_path.clone(),
            schemes: config.schemes.clone(),
            consumes: config.consumes.clone(),
            produces: config.produces.clone(),
            paths: self.paths,
            definitions,
            parameters: global_parameters(),
            responses: global_responses(),
            tags,
            security_definitions: config.security_definitions.clone(),
            security: config.security.clone(),
            external_docs: config.docs.clone(),
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configured tags followed by `names`, deduplicated by name, first occurrence kept
pub fn merge_tags<I>(base: &[Tag], names: I) -> Vec<Tag>
where
    I: IntoIterator<Item = String>,
{
    let mut tags: Vec<Tag> = Vec::new();
    let candidates = base
        .iter()
        .cloned()
        .chain(names.into_iter().map(|name| Tag::new(&name)));

    for tag in candidates {
        if tags.iter().any(|existing| existing.name == tag.name) {
            debug!("Tag {} already present", tag.name);
            continue;
        }
        tags.push(tag);
    }
    tags
}
