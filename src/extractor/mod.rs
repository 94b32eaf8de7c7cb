//! Route enumeration for the host application.
//!
//! Routes come from two places: the static route table the application author
//! declared, and the shadow routes the host generates for controllers and models.
//! Each source has its own extractor; [`enumerate_routes`] runs them in order and
//! concatenates the results.
//!
//! - **Manual routes**: See [`manual::ManualExtractor`]
//! - **Blueprint routes** (actions, REST, associations): See [`blueprint::BlueprintExtractor`]
//!
//! # Example
//!
//! ```no_run
//! use blueprint_swagger::extractor::enumerate_routes;
//! use blueprint_swagger::host::HostSnapshot;
//! use std::path::Path;
//!
//! let snapshot = HostSnapshot::load(Path::new("host.json")).unwrap();
//! let routes = enumerate_routes(&snapshot);
//! println!("Found {} routes", routes.len());
//! ```

pub mod manual;
pub mod blueprint;

use crate::host::{ActionDocs, HostSnapshot};
use crate::openapi_builder::{ParameterRef, ResponseRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Trait for producing route descriptors from a host snapshot.
pub trait RouteExtractor {
    /// Extracts all routes this source knows about, in discovery order.
    fn extract_routes(&self, snapshot: &HostSnapshot) -> Vec<RouteDescriptor>;
}

/// Runs every extractor over the snapshot: manual routes first, then blueprints.
pub fn enumerate_routes(snapshot: &HostSnapshot) -> Vec<RouteDescriptor> {
    let extractors: [Box<dyn RouteExtractor>; 2] = [
        Box::new(manual::ManualExtractor),
        Box::new(blueprint::BlueprintExtractor),
    ];

    extractors
        .iter()
        .flat_map(|extractor| extractor.extract_routes(snapshot))
        .collect()
}

/// One generated or declared route.
///
/// Rest descriptors carry fully computed documentation; Action descriptors carry the
/// action's own documentation block, if any; Manual descriptors carry only the handler.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    /// The URL path pattern (e.g., "/pets/:id" or "/pets/{id}")
    pub path: String,
    /// The HTTP method for this route
    pub method: HttpMethod,
    pub category: RouteCategory,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<ParameterRef>,
    pub responses: IndexMap<String, ResponseRef>,
}

/// Where a route came from.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteCategory {
    /// Declared in the static route table
    Manual { target: String },
    /// Shadow route for a custom controller action
    Action {
        controller_id: String,
        action_name: String,
        /// Display name of the controller, used as the default tag
        controller_name: String,
        docs: Option<ActionDocs>,
    },
    /// Shadow route for a model's CRUD or association endpoints
    Rest,
}

/// HTTP methods a route can be documented under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Parses a route table verb, case-insensitively.
    pub fn parse(verb: &str) -> Option<Self> {
        match verb.to_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl RouteDescriptor {
    /// Create a new RouteDescriptor with no documentation
    pub fn new(path: String, method: HttpMethod, category: RouteCategory) -> Self {
        Self {
            path,
            method,
            category,
            operation_id: None,
            summary: None,
            description: None,
            tags: Vec::new(),
            parameters: Vec::new(),
            responses: IndexMap::new(),
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self.category, RouteCategory::Rest)
    }
}
