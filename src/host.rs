//! Read-only view of the host application handed to the synthesizer.
//!
//! The host dumps its static route table, controller registry, model registry and
//! configuration into one [`HostSnapshot`] once it has finished loading. Field names
//! follow the host's camelCase conventions so the snapshot can be written straight from
//! its runtime objects.

use crate::error::{Error, Result};
use crate::extractor::HttpMethod;
use crate::inflection::capitalize;
use crate::openapi_builder::{
    Contact, ExternalDocs, License, ParameterRef, ResponseRef, SecurityScheme, Tag,
};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Keys on a controller object that are never treated as actions.
pub const RESERVED_CONTROLLER_KEYS: &[&str] = &["identity", "sails", "globalId", "_config", SWAGGER_KEY];

/// Controller key holding the action-level documentation blocks.
pub const SWAGGER_KEY: &str = "_swagger";

/// Everything the synthesizer reads from the host, captured at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSnapshot {
    /// Static route table, `"VERB /path"` or `/path` -> handler
    #[serde(default)]
    pub routes: IndexMap<String, RouteTarget>,
    /// Controller registry keyed by identity. Entries are kept raw so that
    /// non-object entries can be skipped instead of failing the whole load.
    #[serde(default)]
    pub controllers: IndexMap<String, serde_json::Value>,
    /// Model registry keyed by identity
    #[serde(default)]
    pub models: IndexMap<String, ModelDescriptor>,
    /// Global blueprint configuration
    #[serde(default)]
    pub blueprints: BlueprintConfig,
    /// Document-level configuration
    pub swagger: SwaggerConfig,
    /// Which host hooks have finished loading
    #[serde(default)]
    pub hooks: HookStatus,
}

impl HostSnapshot {
    /// Loads a snapshot from a JSON or YAML file, chosen by extension.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading host snapshot: {}", path.display());

        let content = fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );

        let snapshot = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| Error::ParseError {
                file: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| Error::ParseError {
                file: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        Ok(snapshot)
    }

    /// Hooks that have not finished loading yet. Empty means the host is ready.
    pub fn pending_hooks(&self) -> Vec<String> {
        let mut pending = Vec::new();
        if !self.hooks.router {
            pending.push("router".to_string());
        }
        for (name, status) in [
            ("policies", self.hooks.policies),
            ("orm", self.hooks.orm),
            ("controllers", self.hooks.controllers),
        ] {
            if status == Some(false) {
                pending.push(name.to_string());
            }
        }
        pending
    }

    /// Fails with [`Error::HostNotReady`] unless every installed hook has loaded.
    pub fn ensure_ready(&self) -> Result<()> {
        let pending = self.pending_hooks();
        if pending.is_empty() {
            Ok(())
        } else {
            Err(Error::HostNotReady(pending))
        }
    }

    /// Controllers that are JSON objects, in registry order.
    pub fn controller_descriptors(&self) -> Vec<ControllerDescriptor> {
        self.controllers
            .iter()
            .filter_map(|(identity, value)| {
                if !value.is_object() {
                    debug!("Skipping controller entry {}: not an object", identity);
                    return None;
                }
                match serde_json::from_value::<ControllerDescriptor>(value.clone()) {
                    Ok(mut controller) => {
                        if controller.identity.is_none() {
                            controller.identity = Some(identity.clone());
                        }
                        Some(controller)
                    }
                    Err(e) => {
                        warn!("Skipping controller {}: {}", identity, e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Readiness of the host hooks. `None` means the hook is not installed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HookStatus {
    pub router: bool,
    pub policies: Option<bool>,
    pub orm: Option<bool>,
    pub controllers: Option<bool>,
}

impl Default for HookStatus {
    fn default() -> Self {
        Self {
            router: true,
            policies: None,
            orm: None,
            controllers: None,
        }
    }
}

/// Handler bound to a static route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteTarget {
    /// `"PetController.find"` style handler string
    Handler(String),
    /// Explicit target, optionally naming the model the controller serves
    Detailed {
        controller: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
}

impl RouteTarget {
    /// Handler identifier as written in the route table
    pub fn handler(&self) -> String {
        match self {
            RouteTarget::Handler(handler) => handler.clone(),
            RouteTarget::Detailed {
                controller, action, ..
            } => match action {
                Some(action) => format!("{}.{}", controller, action),
                None => controller.clone(),
            },
        }
    }

    /// Model override for `controller_id`, if this entry declares one
    pub fn model_for(&self, controller_id: &str) -> Option<&str> {
        match self {
            RouteTarget::Detailed {
                controller,
                model: Some(model),
                ..
            } if controller_identity(controller) == controller_id => Some(model),
            _ => None,
        }
    }
}

/// `"PetController"` -> `"pet"`
fn controller_identity(name: &str) -> String {
    name.strip_suffix("Controller").unwrap_or(name).to_lowercase()
}

/// Blueprint options controlling shadow route generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlueprintConfig {
    pub prefix: String,
    pub rest_prefix: String,
    pub pluralize: bool,
    pub actions: bool,
    pub rest: bool,
    pub shortcuts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Default for BlueprintConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            rest_prefix: String::new(),
            pluralize: false,
            actions: true,
            rest: true,
            shortcuts: true,
            model: None,
        }
    }
}

/// Per-controller blueprint overrides; every set key wins over the global value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlueprintOverrides {
    pub prefix: Option<String>,
    pub rest_prefix: Option<String>,
    pub pluralize: Option<bool>,
    pub actions: Option<bool>,
    pub rest: Option<bool>,
    pub shortcuts: Option<bool>,
    pub model: Option<String>,
}

impl BlueprintOverrides {
    /// Merges these overrides on top of `global`.
    pub fn apply(&self, global: &BlueprintConfig) -> BlueprintConfig {
        BlueprintConfig {
            prefix: self.prefix.clone().unwrap_or_else(|| global.prefix.clone()),
            rest_prefix: self
                .rest_prefix
                .clone()
                .unwrap_or_else(|| global.rest_prefix.clone()),
            pluralize: self.pluralize.unwrap_or(global.pluralize),
            actions: self.actions.unwrap_or(global.actions),
            rest: self.rest.unwrap_or(global.rest),
            shortcuts: self.shortcuts.unwrap_or(global.shortcuts),
            model: self.model.clone().or_else(|| global.model.clone()),
        }
    }
}

/// A controller as registered by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerDescriptor {
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub global_id: Option<String>,
    /// Action identifiers in declaration order
    #[serde(default, deserialize_with = "lenient_actions")]
    pub actions: Vec<String>,
    #[serde(default, rename = "_config")]
    pub config: BlueprintOverrides,
    /// Documentation blocks keyed by action identifier
    #[serde(default, rename = "_swagger", deserialize_with = "lenient_docs")]
    pub docs: IndexMap<String, ActionDocs>,
}

/// Parses each action's docs block on its own; a malformed block is dropped
/// without taking the rest of the controller with it.
fn lenient_docs<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, ActionDocs>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<IndexMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(action, value)| match serde_json::from_value::<ActionDocs>(value) {
            Ok(docs) => Some((action, docs)),
            Err(e) => {
                warn!("Ignoring documentation for action {}: {}", action, e);
                None
            }
        })
        .collect())
}

/// Keeps the string entries of an action list, skipping anything else.
fn lenient_actions<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::String(action) => Some(action),
            other => {
                debug!("Ignoring non-string action entry {}", other);
                None
            }
        })
        .collect())
}

impl ControllerDescriptor {
    pub fn identity(&self) -> &str {
        self.identity.as_deref().unwrap_or_default()
    }

    /// Global id, derived from the identity when the host did not provide one.
    pub fn global_id(&self) -> String {
        self.global_id
            .clone()
            .unwrap_or_else(|| capitalize(self.identity()))
    }

    /// User-defined actions, reserved keys removed.
    pub fn user_actions(&self) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .map(String::as_str)
            .filter(|action| !RESERVED_CONTROLLER_KEYS.contains(action))
    }
}

/// Documentation an action attaches to itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionDocs {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    /// HTTP methods the action answers; `get` when empty
    pub methods: Vec<HttpMethod>,
    pub tags: Option<Vec<String>>,
    pub parameters: Vec<ParameterRef>,
    pub responses: IndexMap<String, ResponseRef>,
    /// Merge the standard error responses into `responses`
    pub default_responses: bool,
    pub deprecated: bool,
}

/// A data model as declared to the host ORM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub global_id: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDescriptor>,
    #[serde(default)]
    pub associations: Vec<AssociationDescriptor>,
}

/// A scalar attribute of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDescriptor {
    pub name: String,
    #[serde(alias = "type")]
    pub primitive_type: PrimitiveType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: Option<bool>,
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
    #[serde(default)]
    pub enum_values: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub min_length: Option<u64>,
    #[serde(default)]
    pub max_length: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl AttributeDescriptor {
    pub fn new(name: &str, primitive_type: PrimitiveType) -> Self {
        Self {
            name: name.to_string(),
            primitive_type,
            required: false,
            unique: None,
            default_value: None,
            enum_values: None,
            min_length: None,
            max_length: None,
            description: None,
        }
    }
}

/// Attribute types the host ORM understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Text,
    Integer,
    Float,
    Date,
    Datetime,
    Boolean,
    Binary,
    Array,
    Json,
    Email,
}

/// A relationship from one model to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationDescriptor {
    pub alias: String,
    pub kind: AssociationKind,
    /// Identity of the target model
    pub target_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
}

/// Cardinality of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationKind {
    /// to-one
    Model,
    /// to-many
    Collection,
}

/// Document-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Required once generation is enabled, see [`SwaggerConfig::validate`]
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub base_path: Option<String>,
    #[serde(default)]
    pub schemes: Vec<String>,
    #[serde(default = "default_media_types")]
    pub consumes: Vec<String>,
    #[serde(default = "default_media_types")]
    pub produces: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub terms_of_service: Option<String>,
    #[serde(default)]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub security_definitions: Option<IndexMap<String, SecurityScheme>>,
    #[serde(default)]
    pub security: Option<Vec<IndexMap<String, Vec<String>>>>,
    #[serde(default)]
    pub docs: Option<ExternalDocs>,
    /// Where the document is written
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl SwaggerConfig {
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            enabled: true,
            title: title.to_string(),
            version: version.to_string(),
            host: None,
            base_path: None,
            schemes: Vec::new(),
            consumes: default_media_types(),
            produces: default_media_types(),
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
            tags: Vec::new(),
            security_definitions: None,
            security: None,
            docs: None,
            output: None,
        }
    }
}

impl SwaggerConfig {
    /// Checks the fields an enabled configuration must carry.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [("title", &self.title), ("version", &self.version)] {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("swagger.{} is required", key)));
            }
        }
        Ok(())
    }
}

impl Default for SwaggerConfig {
    fn default() -> Self {
        Self::new("API", "1.0.0")
    }
}

fn default_enabled() -> bool {
    true
}

fn default_media_types() -> Vec<String> {
    vec!["application/json".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_win_per_key() {
        let global = BlueprintConfig {
            prefix: "/api".to_string(),
            pluralize: true,
            ..BlueprintConfig::default()
        };
        let overrides = BlueprintOverrides {
            rest: Some(false),
            prefix: Some("/v2".to_string()),
            ..BlueprintOverrides::default()
        };

        let merged = overrides.apply(&global);

        assert_eq!(merged.prefix, "/v2");
        assert!(!merged.rest);
        assert!(merged.pluralize);
        assert!(merged.actions);
    }

    #[test]
    fn test_reserved_keys_are_not_actions() {
        let controller = ControllerDescriptor {
            identity: Some("pet".to_string()),
            actions: vec![
                "identity".to_string(),
                "adopt".to_string(),
                "sails".to_string(),
                "globalId".to_string(),
                "_swagger".to_string(),
                "feed".to_string(),
            ],
            ..ControllerDescriptor::default()
        };

        let actions: Vec<_> = controller.user_actions().collect();
        assert_eq!(actions, vec!["adopt", "feed"]);
    }

    #[test]
    fn test_global_id_derived_from_identity() {
        let controller = ControllerDescriptor {
            identity: Some("pet".to_string()),
            ..ControllerDescriptor::default()
        };
        assert_eq!(controller.global_id(), "Pet");
    }

    #[test]
    fn test_non_object_controllers_are_skipped() {
        let snapshot: HostSnapshot = serde_json::from_value(serde_json::json!({
            "controllers": {
                "pet": { "actions": ["adopt"] },
                "broken": [1, 2, 3],
                "scalar": "nope"
            },
            "swagger": { "title": "Pets", "version": "1.0.0" }
        }))
        .unwrap();

        let controllers = snapshot.controller_descriptors();
        assert_eq!(controllers.len(), 1);
        assert_eq!(controllers[0].identity(), "pet");
    }

    #[test]
    fn test_malformed_action_docs_keep_controller() {
        let snapshot: HostSnapshot = serde_json::from_value(serde_json::json!({
            "controllers": {
                "pet": {
                    "actions": ["adopt", 42, "feed"],
                    "_swagger": {
                        "adopt": { "methods": ["patch"] },
                        "feed": { "summary": "Feed a pet" }
                    }
                }
            },
            "swagger": { "title": "Pets", "version": "1.0.0" }
        }))
        .unwrap();

        let controllers = snapshot.controller_descriptors();
        assert_eq!(controllers.len(), 1);
        assert_eq!(controllers[0].actions, vec!["adopt", "feed"]);
        assert!(!controllers[0].docs.contains_key("adopt"));
        assert_eq!(controllers[0].docs["feed"].summary.as_deref(), Some("Feed a pet"));
    }

    #[test]
    fn test_disabled_swagger_needs_no_title() {
        let snapshot: HostSnapshot =
            serde_json::from_value(serde_json::json!({ "swagger": { "enabled": false } })).unwrap();
        assert!(!snapshot.swagger.enabled);
        assert!(matches!(
            snapshot.swagger.validate(),
            Err(Error::InvalidConfig(message)) if message == "swagger.title is required"
        ));

        let config = SwaggerConfig::new("Pets", "1.0.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pending_hooks() {
        let mut snapshot = HostSnapshot::default();
        assert!(snapshot.ensure_ready().is_ok());

        snapshot.hooks.orm = Some(false);
        snapshot.hooks.policies = Some(true);
        snapshot.hooks.router = false;
        assert_eq!(snapshot.pending_hooks(), vec!["router", "orm"]);
        assert!(matches!(snapshot.ensure_ready(), Err(Error::HostNotReady(_))));
    }

    #[test]
    fn test_route_target_model_override() {
        let target = RouteTarget::Detailed {
            controller: "PetController".to_string(),
            action: Some("find".to_string()),
            model: Some("animal".to_string()),
        };
        assert_eq!(target.model_for("pet"), Some("animal"));
        assert_eq!(target.model_for("owner"), None);
        assert_eq!(target.handler(), "PetController.find");
        assert_eq!(RouteTarget::Handler("x.y".to_string()).model_for("x"), None);
    }

    #[test]
    fn test_attribute_accepts_type_alias() {
        let attr: AttributeDescriptor = serde_json::from_value(serde_json::json!({
            "name": "born",
            "type": "datetime",
            "required": true
        }))
        .unwrap();
        assert_eq!(attr.primitive_type, PrimitiveType::Datetime);
        assert!(attr.required);
        assert_eq!(attr.unique, None);
    }

    #[test]
    fn test_load_yaml_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("host.yaml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(
            b"swagger:\n  title: Pets\n  version: 2.0.0\nblueprints:\n  pluralize: true\nmodels:\n  pet:\n    globalId: Pet\n    attributes:\n      - name: name\n        primitiveType: string\n",
        )
        .unwrap();

        let snapshot = HostSnapshot::load(&path).unwrap();
        assert_eq!(snapshot.swagger.title, "Pets");
        assert!(snapshot.swagger.enabled);
        assert_eq!(snapshot.swagger.consumes, vec!["application/json"]);
        assert!(snapshot.blueprints.pluralize);
        assert!(snapshot.blueprints.rest);
        assert_eq!(snapshot.models["pet"].attributes.len(), 1);
    }

    #[test]
    fn test_load_invalid_snapshot_reports_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("host.json");
        fs::write(&path, "{ not json").unwrap();

        match HostSnapshot::load(&path) {
            Err(Error::ParseError { file, .. }) => assert_eq!(file, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
