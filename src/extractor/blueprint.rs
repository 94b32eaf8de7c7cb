use crate::catalog::{add_default_responses, parameter_ref};
use crate::extractor::{HttpMethod, RouteCategory, RouteDescriptor, RouteExtractor};
use crate::host::{
    AssociationDescriptor, AssociationKind, BlueprintConfig, ControllerDescriptor, HostSnapshot,
    ModelDescriptor,
};
use crate::inflection::{capitalize, pluralize};
use crate::openapi_builder::{
    Parameter, ParameterLocation, ParameterRef, Response, ResponseRef,
};
use crate::schema_generator::{Schema, DEFAULT_ERROR};
use indexmap::IndexMap;
use log::{debug, warn};

/// Catalog parameters accepted by every list endpoint
const LIST_PARAMETERS: [&str; 5] = ["where", "limit", "skip", "sort", "callback"];

/// Extractor for the shadow routes the host generates from controllers and models
pub struct BlueprintExtractor;

impl RouteExtractor for BlueprintExtractor {
    fn extract_routes(&self, snapshot: &HostSnapshot) -> Vec<RouteDescriptor> {
        snapshot
            .controller_descriptors()
            .iter()
            .fold(Vec::new(), |mut routes, controller| {
                routes.extend(controller_routes(snapshot, controller));
                routes
            })
    }
}

/// Action, REST and association routes for one controller, in that order.
fn controller_routes(snapshot: &HostSnapshot, controller: &ControllerDescriptor) -> Vec<RouteDescriptor> {
    let config = controller.config.apply(&snapshot.blueprints);
    let identity = controller.identity();
    let segment = if config.pluralize {
        pluralize(identity)
    } else {
        identity.to_string()
    };
    let base_route = format!("{}/{}", config.prefix, segment);
    let base_rest_route = format!("{}{}/{}", config.prefix, config.rest_prefix, segment);
    let controller_name = pluralize(&controller.global_id());

    debug!(
        "Controller {}: baseRoute={} baseRestRoute={}",
        identity, base_route, base_rest_route
    );

    let mut routes = Vec::new();

    if config.actions {
        routes.extend(action_routes(controller, &base_route, &controller_name));
    }

    if config.shortcuts {
        debug!("Shortcut routes for {} are not documented", identity);
    }

    if !config.rest {
        debug!("REST routes disabled for {}", identity);
        return routes;
    }

    let Some(model) = resolve_model(snapshot, controller, &config) else {
        debug!("No model backs controller {}, skipping REST routes", identity);
        return routes;
    };

    let rest = RestRoutes {
        base: base_rest_route,
        model,
        models: &snapshot.models,
        tag: controller_name,
    };
    routes.extend(rest.crud_routes());

    for association in model
        .associations
        .iter()
        .filter(|a| a.kind == AssociationKind::Collection)
    {
        match snapshot.models.get(&association.target_model) {
            Some(target) => routes.extend(rest.association_routes(association, target)),
            None => warn!(
                "Association {}.{} targets unknown model {}, skipping",
                model.global_id, association.alias, association.target_model
            ),
        }
    }

    routes
}

/// One descriptor per action and declared method. The documentation travels in the
/// category; the descriptor's own doc fields stay empty.
fn action_routes(
    controller: &ControllerDescriptor,
    base_route: &str,
    controller_name: &str,
) -> Vec<RouteDescriptor> {
    let mut routes = Vec::new();

    for action in controller.user_actions() {
        let docs = controller.docs.get(action).cloned();
        let methods = match &docs {
            Some(docs) if !docs.methods.is_empty() => docs.methods.clone(),
            _ => vec![HttpMethod::Get],
        };
        let path = format!("{}/{}", base_route, action.to_lowercase());

        for method in methods {
            routes.push(RouteDescriptor::new(
                path.clone(),
                method,
                RouteCategory::Action {
                    controller_id: controller.identity().to_string(),
                    action_name: action.to_string(),
                    controller_name: controller_name.to_string(),
                    docs: docs.clone(),
                },
            ));
        }
    }

    routes
}

/// Model behind a controller: config override, then route table override, then the
/// model sharing the controller's global id, then the controller identity.
fn resolve_model<'a>(
    snapshot: &'a HostSnapshot,
    controller: &ControllerDescriptor,
    config: &BlueprintConfig,
) -> Option<&'a ModelDescriptor> {
    let identity = controller.identity();
    let global_id = controller.global_id();

    let candidate = config
        .model
        .clone()
        .or_else(|| {
            snapshot
                .routes
                .values()
                .find_map(|target| target.model_for(identity))
                .map(str::to_string)
        })
        .or_else(|| {
            snapshot
                .models
                .iter()
                .find(|(_, model)| model.global_id == global_id)
                .map(|(key, _)| key.clone())
        })
        .unwrap_or_else(|| identity.to_string());

    snapshot
        .models
        .get(&candidate)
        .or_else(|| snapshot.models.get(&candidate.to_lowercase()))
}

/// Builder for the REST descriptors of one model
struct RestRoutes<'a> {
    base: String,
    model: &'a ModelDescriptor,
    models: &'a IndexMap<String, ModelDescriptor>,
    tag: String,
}

impl RestRoutes<'_> {
    /// list, get by id, create, update, delete
    fn crud_routes(&self) -> Vec<RouteDescriptor> {
        let name = &self.model.global_id;
        let plural = pluralize(name);
        let item = format!("{}/{{id}}", self.base);

        let mut not_found = IndexMap::new();
        not_found.insert(
            "404".to_string(),
            inline(
                &format!("No {} found with the given id", name),
                Some(Schema::reference(DEFAULT_ERROR)),
            ),
        );

        vec![
            self.route(
                &self.base,
                HttpMethod::Get,
                format!("find{}", name),
                format!("List {}", plural),
                format!(
                    "Find a list of **{}** records that match the specified criteria",
                    name
                ),
                self.list_parameters(),
                success("200", &format!("List of {}", plural), &plural),
            ),
            self.route(
                &item,
                HttpMethod::Get,
                format!("findOne{}", name),
                format!("Get a {} by id", name),
                format!("Find a single **{}** record by its primary key", name),
                vec![id_parameter("id", name)],
                merge(success("200", &format!("{} record", name), name), not_found),
            ),
            self.route(
                &self.base,
                HttpMethod::Post,
                format!("create{}", name),
                format!("Create a {}", name),
                format!("Create a new **{}** record", name),
                vec![body_parameter(name)],
                success("201", &format!("Created {}", name), name),
            ),
            self.route(
                &item,
                HttpMethod::Put,
                format!("update{}", name),
                format!("Update a {}", name),
                format!("Update an existing **{}** record", name),
                vec![id_parameter("id", name), body_parameter(name)],
                success("200", &format!("Updated {}", name), name),
            ),
            self.route(
                &item,
                HttpMethod::Delete,
                format!("destroy{}", name),
                format!("Delete a {}", name),
                format!("Delete an existing **{}** record", name),
                vec![id_parameter("id", name)],
                success("200", &format!("Deleted {}", name), name),
            ),
        ]
    }

    /// list associated, attach existing, create and attach, detach
    fn association_routes(
        &self,
        association: &AssociationDescriptor,
        target: &ModelDescriptor,
    ) -> Vec<RouteDescriptor> {
        let parent = &self.model.global_id;
        let child = &target.global_id;
        let alias = &association.alias;
        let suffix = format!("{}{}", parent, capitalize(alias));
        let collection = format!("{}/{{parentId}}/{}", self.base, pluralize(alias));
        let member = format!("{}/{{id}}", collection);
        let parent_id = id_parameter("parentId", parent);

        let mut populate_parameters = vec![parent_id.clone()];
        populate_parameters.extend(LIST_PARAMETERS[..4].iter().map(|name| parameter_ref(name)));

        vec![
            self.route(
                &collection,
                HttpMethod::Get,
                format!("populate{}", suffix),
                format!("List {} of a {}", alias, parent),
                format!(
                    "Find the **{}** records associated with a **{}** through `{}`",
                    child, parent, alias
                ),
                populate_parameters,
                success("200", &format!("List of {}", pluralize(child)), &pluralize(child)),
            ),
            self.route(
                &member,
                HttpMethod::Post,
                format!("add{}", suffix),
                format!("Add a {} to {}", child, alias),
                format!(
                    "Associate an existing **{}** with a **{}** through `{}`",
                    child, parent, alias
                ),
                vec![parent_id.clone(), id_parameter("id", child)],
                success("200", &format!("Updated {}", parent), parent),
            ),
            self.route(
                &collection,
                HttpMethod::Post,
                format!("create{}", suffix),
                format!("Create a {} in {}", child, alias),
                format!(
                    "Create a new **{}** and associate it with a **{}** through `{}`",
                    child, parent, alias
                ),
                vec![parent_id.clone(), body_parameter(child)],
                success("201", &format!("Updated {}", parent), parent),
            ),
            self.route(
                &member,
                HttpMethod::Delete,
                format!("remove{}", suffix),
                format!("Remove a {} from {}", child, alias),
                format!(
                    "Dissociate a **{}** from a **{}** through `{}`",
                    child, parent, alias
                ),
                vec![parent_id, id_parameter("id", child)],
                success("200", &format!("Updated {}", parent), parent),
            ),
        ]
    }

    /// Catalog refs followed by one query parameter per attribute and association
    fn list_parameters(&self) -> Vec<ParameterRef> {
        let mut by_name: IndexMap<String, Parameter> = IndexMap::new();

        for attribute in &self.model.attributes {
            let mut parameter = Parameter::typed(
                &attribute.name,
                ParameterLocation::Query,
                false,
                attribute.primitive_type.to_schema(),
            );
            parameter.description = attribute.description.clone();
            by_name.insert(attribute.name.clone(), parameter);
        }

        for association in &self.model.associations {
            if !self.models.contains_key(&association.target_model) {
                continue;
            }
            let id = Schema::primitive("string", Some("id"));
            let schema = match association.kind {
                AssociationKind::Model => id,
                AssociationKind::Collection => Schema::array_of(id),
            };
            by_name.insert(
                association.alias.clone(),
                Parameter::typed(&association.alias, ParameterLocation::Query, false, schema),
            );
        }

        LIST_PARAMETERS
            .iter()
            .map(|name| parameter_ref(name))
            .chain(by_name.into_values().map(ParameterRef::Inline))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn route(
        &self,
        path: &str,
        method: HttpMethod,
        operation_id: String,
        summary: String,
        description: String,
        parameters: Vec<ParameterRef>,
        responses: IndexMap<String, ResponseRef>,
    ) -> RouteDescriptor {
        let mut route = RouteDescriptor::new(path.to_string(), method, RouteCategory::Rest);
        route.operation_id = Some(operation_id);
        route.summary = Some(summary);
        route.description = Some(description);
        route.tags = vec![self.tag.clone()];
        route.parameters = parameters;
        route.responses = add_default_responses(&responses);
        route
    }
}

fn inline(description: &str, schema: Option<Schema>) -> ResponseRef {
    ResponseRef::Inline(Response::new(description, schema))
}

/// Single success response whose body is the named definition
fn success(code: &str, description: &str, definition: &str) -> IndexMap<String, ResponseRef> {
    let mut responses = IndexMap::new();
    responses.insert(
        code.to_string(),
        inline(description, Some(Schema::reference(definition))),
    );
    responses
}

fn merge(
    mut first: IndexMap<String, ResponseRef>,
    second: IndexMap<String, ResponseRef>,
) -> IndexMap<String, ResponseRef> {
    first.extend(second);
    first
}

fn id_parameter(name: &str, model: &str) -> ParameterRef {
    ParameterRef::Inline(
        Parameter::typed(
            name,
            ParameterLocation::Path,
            true,
            Schema::primitive("string", Some("id")),
        )
        .with_description(&format!("The primary key of the {} record", model)),
    )
}

fn body_parameter(model: &str) -> ParameterRef {
    ParameterRef::Inline(
        Parameter::body("body", Schema::reference(model))
            .with_description(&format!("The **{}** record", model)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ActionDocs, AttributeDescriptor, PrimitiveType, RouteTarget};
    use serde_json::json;

    fn pet_model() -> ModelDescriptor {
        let mut name = AttributeDescriptor::new("name", PrimitiveType::String);
        name.required = true;
        ModelDescriptor {
            global_id: "Pet".to_string(),
            attributes: vec![name, AttributeDescriptor::new("age", PrimitiveType::Integer)],
            associations: Vec::new(),
        }
    }

    fn owner_model() -> ModelDescriptor {
        ModelDescriptor {
            global_id: "Owner".to_string(),
            attributes: vec![AttributeDescriptor::new("name", PrimitiveType::String)],
            associations: vec![AssociationDescriptor {
                alias: "pets".to_string(),
                kind: AssociationKind::Collection,
                target_model: "pet".to_string(),
                via: Some("owner".to_string()),
            }],
        }
    }

    fn host(controllers: serde_json::Value) -> HostSnapshot {
        let mut snapshot: HostSnapshot = serde_json::from_value(json!({
            "controllers": controllers,
            "swagger": { "title": "Pets", "version": "1.0.0" }
        }))
        .unwrap();
        snapshot.blueprints.pluralize = true;
        snapshot.models.insert("pet".to_string(), pet_model());
        snapshot.models.insert("owner".to_string(), owner_model());
        snapshot
    }

    fn signatures(routes: &[RouteDescriptor]) -> Vec<(HttpMethod, &str)> {
        routes.iter().map(|r| (r.method, r.path.as_str())).collect()
    }

    #[test]
    fn test_pet_controller_rest_routes() {
        let snapshot = host(json!({ "pet": {} }));
        let routes = BlueprintExtractor.extract_routes(&snapshot);

        assert_eq!(
            signatures(&routes),
            vec![
                (HttpMethod::Get, "/pets"),
                (HttpMethod::Get, "/pets/{id}"),
                (HttpMethod::Post, "/pets"),
                (HttpMethod::Put, "/pets/{id}"),
                (HttpMethod::Delete, "/pets/{id}"),
            ]
        );
        assert!(routes.iter().all(RouteDescriptor::is_rest));
        assert!(routes.iter().all(|r| r.tags == vec!["Pets"]));
        assert_eq!(
            routes.iter().map(|r| r.operation_id.clone().unwrap()).collect::<Vec<_>>(),
            vec!["findPet", "findOnePet", "createPet", "updatePet", "destroyPet"]
        );
    }

    #[test]
    fn test_rest_responses_always_carry_error_codes() {
        let snapshot = host(json!({ "pet": {}, "owner": {} }));
        let routes = BlueprintExtractor.extract_routes(&snapshot);

        for route in &routes {
            for code in ["400", "403", "404", "500"] {
                assert!(
                    route.responses.contains_key(code),
                    "{} {} lacks {}",
                    route.method.as_str(),
                    route.path,
                    code
                );
            }
        }

        // findOne keeps its own 404
        let find_one = &routes[1];
        match &find_one.responses["404"] {
            ResponseRef::Inline(response) => {
                assert_eq!(response.description, "No Pet found with the given id")
            }
            other => panic!("expected inline 404, got {:?}", other),
        }
        assert_eq!(
            find_one.responses.keys().collect::<Vec<_>>(),
            vec!["200", "404", "400", "403", "500"]
        );
    }

    #[test]
    fn test_list_parameters() {
        let snapshot = host(json!({ "owner": {} }));
        let routes = BlueprintExtractor.extract_routes(&snapshot);
        let list = &routes[0];

        let values: Vec<_> = list
            .parameters
            .iter()
            .map(|p| serde_json::to_value(p).unwrap())
            .collect();

        assert_eq!(values[0], json!({"$ref": "#/parameters/where"}));
        assert_eq!(values[4], json!({"$ref": "#/parameters/callback"}));
        assert_eq!(
            values[5],
            json!({"name": "name", "in": "query", "required": false, "type": "string", "format": "string"})
        );
        assert_eq!(
            values[6],
            json!({
                "name": "pets",
                "in": "query",
                "required": false,
                "type": "array",
                "items": {"type": "string", "format": "id"}
            })
        );
        assert_eq!(values.len(), 7);
    }

    #[test]
    fn test_association_routes() {
        let snapshot = host(json!({ "owner": {} }));
        let routes = BlueprintExtractor.extract_routes(&snapshot);

        assert_eq!(routes.len(), 9);
        assert_eq!(
            signatures(&routes[5..]),
            vec![
                (HttpMethod::Get, "/owners/{parentId}/pets"),
                (HttpMethod::Post, "/owners/{parentId}/pets/{id}"),
                (HttpMethod::Post, "/owners/{parentId}/pets"),
                (HttpMethod::Delete, "/owners/{parentId}/pets/{id}"),
            ]
        );
        assert_eq!(routes[5].operation_id.as_deref(), Some("populateOwnerPets"));
        assert_eq!(routes[8].operation_id.as_deref(), Some("removeOwnerPets"));

        let populate = serde_json::to_value(&routes[5].responses["200"]).unwrap();
        assert_eq!(populate["schema"], json!({"$ref": "#/definitions/Pets"}));
        let create = serde_json::to_value(&routes[7].parameters[1]).unwrap();
        assert_eq!(create["in"], "body");
        assert_eq!(create["schema"], json!({"$ref": "#/definitions/Pet"}));
    }

    #[test]
    fn test_singular_alias_is_pluralized_in_path() {
        let mut snapshot = host(json!({ "owner": {} }));
        snapshot.models["owner"].associations[0].alias = "pet".to_string();

        let routes = BlueprintExtractor.extract_routes(&snapshot);
        assert_eq!(
            signatures(&routes[5..]),
            vec![
                (HttpMethod::Get, "/owners/{parentId}/pets"),
                (HttpMethod::Post, "/owners/{parentId}/pets/{id}"),
                (HttpMethod::Post, "/owners/{parentId}/pets"),
                (HttpMethod::Delete, "/owners/{parentId}/pets/{id}"),
            ]
        );
        assert_eq!(routes[5].operation_id.as_deref(), Some("populateOwnerPet"));
    }

    #[test]
    fn test_malformed_action_docs_keep_rest_routes() {
        let snapshot = host(json!({
            "pet": {
                "actions": ["adopt"],
                "_swagger": { "adopt": { "methods": ["patch"] } }
            }
        }));

        let routes = BlueprintExtractor.extract_routes(&snapshot);
        assert_eq!(routes.len(), 6);
        assert_eq!(routes[0].path, "/pets/adopt");
        assert_eq!(routes[0].method, HttpMethod::Get);
        assert!(routes[1..].iter().all(|r| r.is_rest() && r.tags == vec!["Pets"]));
    }

    #[test]
    fn test_prefixes_and_no_pluralize() {
        let mut snapshot = host(json!({
            "pet": { "_config": { "pluralize": false } }
        }));
        snapshot.blueprints.prefix = "/api".to_string();
        snapshot.blueprints.rest_prefix = "/v1".to_string();

        let routes = BlueprintExtractor.extract_routes(&snapshot);
        assert_eq!(routes[0].path, "/api/v1/pet");
        assert_eq!(routes[1].path, "/api/v1/pet/{id}");
    }

    #[test]
    fn test_action_routes() {
        let snapshot = host(json!({
            "pet": {
                "actions": ["identity", "Adopt", "feed", "_swagger"],
                "_swagger": {
                    "Adopt": { "summary": "Adopt a pet", "methods": ["post", "put"] }
                }
            }
        }));

        let routes = BlueprintExtractor.extract_routes(&snapshot);
        let actions: Vec<_> = routes
            .iter()
            .filter(|r| matches!(r.category, RouteCategory::Action { .. }))
            .collect();

        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0].path, "/pets/adopt");
        assert_eq!(actions[0].method, HttpMethod::Post);
        assert_eq!(actions[1].method, HttpMethod::Put);
        assert!(actions[0].summary.is_none());
        match &actions[0].category {
            RouteCategory::Action { docs: Some(docs), .. } => {
                assert_eq!(docs.summary.as_deref(), Some("Adopt a pet"))
            }
            other => panic!("unexpected category {:?}", other),
        }
        assert_eq!(actions[2].path, "/pets/feed");
        match &actions[2].category {
            RouteCategory::Action {
                docs,
                controller_name,
                ..
            } => {
                assert!(docs.is_none());
                assert_eq!(controller_name, "Pets");
            }
            other => panic!("unexpected category {:?}", other),
        }
    }

    #[test]
    fn test_actions_disabled() {
        let mut snapshot = host(json!({ "pet": { "actions": ["adopt"] } }));
        snapshot.blueprints.actions = false;

        let routes = BlueprintExtractor.extract_routes(&snapshot);
        assert!(routes.iter().all(RouteDescriptor::is_rest));
    }

    #[test]
    fn test_rest_disabled_by_override() {
        let snapshot = host(json!({
            "pet": { "actions": ["adopt"], "_config": { "rest": false } }
        }));

        let routes = BlueprintExtractor.extract_routes(&snapshot);
        assert_eq!(routes.len(), 1);
        assert!(!routes[0].is_rest());
    }

    #[test]
    fn test_controller_without_model() {
        let snapshot = host(json!({ "health": { "actions": ["check"] } }));
        let routes = BlueprintExtractor.extract_routes(&snapshot);
        assert_eq!(signatures(&routes), vec![(HttpMethod::Get, "/healths/check")]);
    }

    #[test]
    fn test_model_resolution_order() {
        // config override
        let snapshot = host(json!({ "animal": { "_config": { "model": "pet" } } }));
        let routes = BlueprintExtractor.extract_routes(&snapshot);
        assert_eq!(routes[0].operation_id.as_deref(), Some("findPet"));
        assert_eq!(routes[0].path, "/animals");

        // route table override
        let mut snapshot = host(json!({ "animal": {} }));
        snapshot.routes.insert(
            "GET /animals/special".to_string(),
            RouteTarget::Detailed {
                controller: "AnimalController".to_string(),
                action: Some("special".to_string()),
                model: Some("owner".to_string()),
            },
        );
        let routes = BlueprintExtractor.extract_routes(&snapshot);
        assert_eq!(routes[0].operation_id.as_deref(), Some("findOwner"));

        // global id match
        let snapshot = host(json!({ "house-pet": { "globalId": "Pet" } }));
        let routes = BlueprintExtractor.extract_routes(&snapshot);
        assert_eq!(routes[0].operation_id.as_deref(), Some("findPet"));
    }

    #[test]
    fn test_unknown_association_target_skipped() {
        let mut snapshot = host(json!({ "owner": {} }));
        snapshot.models.shift_remove("pet");

        let routes = BlueprintExtractor.extract_routes(&snapshot);
        assert_eq!(routes.len(), 5);
        // the association is not offered as a query filter either
        assert_eq!(routes[0].parameters.len(), 6);
    }

    #[test]
    fn test_action_docs_round_trip_from_json() {
        let docs: ActionDocs = serde_json::from_value(json!({
            "summary": "Adopt",
            "parameters": [{"$ref": "#/parameters/where"}],
            "responses": {"200": {"description": "Adopted"}},
            "defaultResponses": true
        }))
        .unwrap();
        assert!(docs.default_responses);
        assert_eq!(docs.parameters, vec![parameter_ref("where")]);
        assert_eq!(docs.responses["200"], inline("Adopted", None));
    }
}
