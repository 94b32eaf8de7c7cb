use crate::extractor::{enumerate_routes, RouteDescriptor};
use crate::host::HostSnapshot;
use crate::inflection::pluralize;
use crate::openapi_builder::{merge_tags, OpenApiBuilder, SwaggerDocument};
use crate::schema_generator::SchemaGenerator;
use log::{debug, info};

/// Counts reported after a synthesis run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisSummary {
    pub routes: usize,
    pub operations: usize,
    pub paths: usize,
    pub definitions: usize,
}

/// Builds the Swagger document for a fully loaded host.
///
/// The snapshot is only read; every call builds a new document from scratch.
pub fn synthesize(snapshot: &HostSnapshot) -> SwaggerDocument {
    synthesize_with_summary(snapshot).0
}

/// Same as [`synthesize`], also returning counts for logging.
pub fn synthesize_with_summary(snapshot: &HostSnapshot) -> (SwaggerDocument, SynthesisSummary) {
    info!("Enumerating routes...");
    let routes: Vec<RouteDescriptor> = enumerate_routes(snapshot);
    debug!("Enumerated {} routes", routes.len());

    let mut builder = OpenApiBuilder::new();
    for route in &routes {
        builder.add_route(route);
    }
    let operations = builder.operation_count();

    info!("Mapping {} models...", snapshot.models.len());
    let mut schema_gen = SchemaGenerator::new(&snapshot.models);
    schema_gen.generate_all();

    let controller_tags = snapshot
        .controller_descriptors()
        .iter()
        .map(|controller| pluralize(&controller.global_id()))
        .collect::<Vec<_>>();
    let tags = merge_tags(&snapshot.swagger.tags, controller_tags);

    let document = builder.build(&snapshot.swagger, schema_gen.into_schemas(), tags);
    let summary = SynthesisSummary {
        routes: routes.len(),
        operations,
        paths: document.paths.len(),
        definitions: document.definitions.len(),
    };

    (document, summary)
}
