use crate::extractor::{HttpMethod, RouteCategory, RouteDescriptor, RouteExtractor};
use crate::host::HostSnapshot;
use log::debug;

/// Extractor for the host's static route table
pub struct ManualExtractor;

impl RouteExtractor for ManualExtractor {
    fn extract_routes(&self, snapshot: &HostSnapshot) -> Vec<RouteDescriptor> {
        snapshot
            .routes
            .iter()
            .filter_map(|(key, target)| {
                let (method, path) = parse_route_key(key)?;
                Some(RouteDescriptor::new(
                    path.to_string(),
                    method,
                    RouteCategory::Manual {
                        target: target.handler(),
                    },
                ))
            })
            .collect()
    }
}

/// Splits `"VERB /path"` into its parts. A bare `/path` is a GET.
fn parse_route_key(key: &str) -> Option<(HttpMethod, &str)> {
    let key = key.trim();
    match key.split_once(char::is_whitespace) {
        Some((verb, path)) => match HttpMethod::parse(verb) {
            Some(method) => Some((method, path.trim())),
            None => {
                debug!("Skipping route {}: unsupported verb {}", key, verb);
                None
            }
        },
        None => Some((HttpMethod::Get, key)),
    }
}
