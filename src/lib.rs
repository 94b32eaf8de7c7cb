//! Blueprint Swagger - Swagger 2.0 documentation for MVC applications with blueprint routes.
//!
//! The host application generates "shadow" routes from its controllers and models:
//! custom actions, CRUD endpoints and association sub-resources. This library reads a
//! snapshot of the host's registries and produces a Swagger 2.0 document describing those
//! routes, so the documentation always matches what the application actually serves.
//!
//! # Architecture
//!
//! 1. [`host`] - Read-only snapshot of routes, controllers, models and configuration
//! 2. [`extractor`] - Classifies and enumerates routes (manual, action, REST)
//! 3. [`schema_generator`] - Maps model declarations to Swagger definitions
//! 4. [`catalog`] - Shared query parameters and error responses
//! 5. [`openapi_builder`] - Builds the `paths` map and assembles the document
//! 6. [`synthesizer`] - Runs the whole pipeline for one snapshot
//! 7. [`serializer`] - Serializes the document to JSON or YAML
//!
//! # Example Usage
//!
//! ```no_run
//! use blueprint_swagger::{host::HostSnapshot, serializer::serialize_json, synthesizer::synthesize};
//! use std::path::Path;
//!
//! let snapshot = HostSnapshot::load(Path::new("host.json")).unwrap();
//! snapshot.ensure_ready().unwrap();
//!
//! let document = synthesize(&snapshot);
//! println!("{}", serialize_json(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod host;
pub mod inflection;
pub mod extractor;
pub mod schema_generator;
pub mod catalog;
pub mod openapi_builder;
pub mod synthesizer;
pub mod serializer;
pub mod error;
