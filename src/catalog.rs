//! Reusable query parameters and error responses shared by every generated route.
//!
//! Routes refer to these by `$ref` so the document carries each shape once.

use crate::openapi_builder::{Parameter, ParameterLocation, ParameterRef, Response, ResponseRef};
use crate::schema_generator::{Schema, DEFAULT_ERROR};
use indexmap::IndexMap;
use serde_json::json;

/// Standard error responses: status code and catalog name.
const DEFAULT_RESPONSES: [(&str, &str); 4] = [
    ("400", "InvalidRequest"),
    ("403", "Forbidden"),
    ("404", "NotFound"),
    ("500", "ServerError"),
];

/// The `where`, `limit`, `skip`, `sort` and `callback` query parameters.
pub fn global_parameters() -> IndexMap<String, Parameter> {
    let query = |name: &str, schema: Schema, description: &str| {
        (
            name.to_string(),
            Parameter::typed(name, ParameterLocation::Query, false, schema)
                .with_description(description),
        )
    };

    IndexMap::from([
        query(
            "where",
            Schema::primitive("string", None),
            "JSON encoded WHERE criteria object",
        ),
        query(
            "limit",
            Schema {
                default: Some(json!(20)),
                ..Schema::primitive("integer", Some("int32"))
            },
            "The maximum number of records to send back",
        ),
        query(
            "skip",
            Schema {
                default: Some(json!(0)),
                ..Schema::primitive("integer", Some("int32"))
            },
            "The number of records to skip",
        ),
        query(
            "sort",
            Schema {
                default: Some(json!("id ASC")),
                ..Schema::primitive("string", None)
            },
            "Order of returned records, e.g. `name ASC` or `age DESC`",
        ),
        query(
            "callback",
            Schema::primitive("string", None),
            "If specified, a JSONP response will be sent instead of JSON",
        ),
    ])
}

/// `NotFound`, `ServerError`, `Forbidden` and `InvalidRequest`, each carrying a `DefaultError`.
pub fn global_responses() -> IndexMap<String, Response> {
    let error = |name: &str, description: &str| {
        (
            name.to_string(),
            Response::new(description, Some(Schema::reference(DEFAULT_ERROR))),
        )
    };

    IndexMap::from([
        error("NotFound", "Not found"),
        error("ServerError", "Server error"),
        error("Forbidden", "Forbidden"),
        error("InvalidRequest", "Invalid request"),
    ])
}

/// `$ref` to a catalog parameter
pub fn parameter_ref(name: &str) -> ParameterRef {
    ParameterRef::Reference {
        reference: format!("#/parameters/{}", name),
    }
}

/// `$ref` to a catalog response
pub fn response_ref(name: &str) -> ResponseRef {
    ResponseRef::Reference {
        reference: format!("#/responses/{}", name),
    }
}

/// Returns `responses` with 400/403/404/500 filled in; existing codes are kept.
pub fn add_default_responses(responses: &IndexMap<String, ResponseRef>) -> IndexMap<String, ResponseRef> {
    let mut merged = responses.clone();
    for (code, name) in DEFAULT_RESPONSES {
        merged
            .entry(code.to_string())
            .or_insert_with(|| response_ref(name));
    }
    merged
}
