use crate::host::{AssociationKind, AttributeDescriptor, ModelDescriptor, PrimitiveType};
use crate::inflection::pluralize;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Name of the error envelope every shared error response points at.
pub const DEFAULT_ERROR: &str = "DefaultError";

/// Schema generator - converts model declarations to Swagger definitions
pub struct SchemaGenerator<'a> {
    /// Model registry used to resolve association targets
    models: &'a IndexMap<String, ModelDescriptor>,
    /// Generated definitions in insertion order
    schemas: IndexMap<String, Schema>,
}

/// Swagger 2.0 Schema object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format hint (e.g., "int64", "date-time", "email")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Reference to another definition
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Schema {
    /// `{type, format}` schema
    pub fn primitive(schema_type: &str, format: Option<&str>) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            format: format.map(str::to_string),
            ..Self::default()
        }
    }

    /// `$ref` to `#/definitions/<name>`
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("#/definitions/{}", name)),
            ..Self::default()
        }
    }

    /// `{type: array, items}`
    pub fn array_of(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }
}

impl PrimitiveType {
    /// Swagger `type` and `format` for this attribute type.
    pub fn type_and_format(&self) -> (&'static str, Option<&'static str>) {
        match self {
            PrimitiveType::String => ("string", Some("string")),
            PrimitiveType::Text => ("string", Some("text")),
            PrimitiveType::Integer => ("integer", Some("int64")),
            PrimitiveType::Float => ("float", Some("float")),
            PrimitiveType::Date => ("string", Some("date")),
            PrimitiveType::Datetime => ("string", Some("date-time")),
            PrimitiveType::Boolean => ("boolean", None),
            PrimitiveType::Binary => ("string", Some("binary")),
            PrimitiveType::Array => ("array", None),
            PrimitiveType::Json => ("string", Some("json")),
            PrimitiveType::Email => ("string", Some("email")),
        }
    }

    /// Schema for a value of this type; arrays hold strings.
    pub fn to_schema(&self) -> Schema {
        match self {
            PrimitiveType::Array => Schema::array_of(Schema::primitive("string", None)),
            other => {
                let (schema_type, format) = other.type_and_format();
                Schema::primitive(schema_type, format)
            }
        }
    }
}

/// Output of [`SchemaGenerator::map_model`]: the model definition and its collection.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedModel {
    pub name: String,
    pub schema: Schema,
    pub plural_name: String,
    pub plural: Schema,
}

impl<'a> SchemaGenerator<'a> {
    /// Create a new SchemaGenerator over a model registry
    pub fn new(models: &'a IndexMap<String, ModelDescriptor>) -> Self {
        debug!("Initializing SchemaGenerator over {} models", models.len());
        let mut schemas = IndexMap::new();
        schemas.insert(DEFAULT_ERROR.to_string(), default_error_schema());
        Self { models, schemas }
    }

    /// Map a single model into its definition and its pluralized array wrapper
    pub fn map_model(&self, identity: &str, model: &ModelDescriptor) -> MappedModel {
        debug!("Mapping model {} ({})", identity, model.global_id);

        let mut properties: IndexMap<String, Schema> = IndexMap::new();
        let mut required = Vec::new();

        for attribute in &model.attributes {
            properties.insert(attribute.name.clone(), attribute_schema(attribute));
            if attribute.required {
                required.push(attribute.name.clone());
            }
        }

        for association in &model.associations {
            let Some(target) = self.models.get(&association.target_model) else {
                warn!(
                    "Model {}: association {} targets unknown model {}, skipping",
                    identity, association.alias, association.target_model
                );
                continue;
            };

            let target_ref = Schema::reference(&target.global_id);
            let schema = match association.kind {
                AssociationKind::Model => target_ref,
                AssociationKind::Collection => Schema::array_of(target_ref),
            };
            // Replaces a same-named attribute in place, required flag included
            properties.insert(association.alias.clone(), schema);
            required.retain(|name| name != &association.alias);
        }

        let schema = Schema {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required)
            },
            ..Schema::default()
        };

        MappedModel {
            name: model.global_id.clone(),
            schema,
            plural_name: pluralize(&model.global_id),
            plural: Schema::array_of(Schema::reference(&model.global_id)),
        }
    }

    /// Map every model in the registry into the definitions collection
    pub fn generate_all(&mut self) {
        let models = self.models;
        for (identity, model) in models {
            let mapped = self.map_model(identity, model);
            let distinct = mapped.plural_name != mapped.name;
            if !distinct {
                debug!("Model {} has no distinct plural form", mapped.name);
            }
            self.insert(mapped.name, mapped.schema);
            if distinct {
                self.insert(mapped.plural_name, mapped.plural);
            }
        }
    }

    fn insert(&mut self, name: String, schema: Schema) {
        if self.schemas.contains_key(&name) {
            warn!("Definition {} already exists and is overwritten", name);
        }
        self.schemas.insert(name, schema);
    }

    /// Consume the generator and return the definitions
    pub fn into_schemas(self) -> IndexMap<String, Schema> {
        self.schemas
    }
}

/// Property schema for one attribute, constraints copied when present.
fn attribute_schema(attribute: &AttributeDescriptor) -> Schema {
    Schema {
        description: attribute.description.clone(),
        enum_values: attribute.enum_values.clone(),
        unique_items: attribute.unique,
        min_length: attribute.min_length,
        max_length: attribute.max_length,
        default: attribute.default_value.clone(),
        ..attribute.primitive_type.to_schema()
    }
}

/// `{status: string, error: string}`
fn default_error_schema() -> Schema {
    let mut properties = IndexMap::new();
    properties.insert("status".to_string(), Schema::primitive("string", None));
    properties.insert("error".to_string(), Schema::primitive("string", None));
    Schema {
        schema_type: Some("object".to_string()),
        properties: Some(properties),
        ..Schema::default()
    }
}
