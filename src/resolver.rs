use crate::error::PeekError;
use crate::model::ResourceIdentifier;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResource;
use std::collections::HashMap;

/// Maps a (resource name, optional group) pair onto a registered type.
pub trait TypeMapper {
    fn resource_for(&self, name: &str, group: Option<&str>) -> Option<ResourceIdentifier>;
}

#[derive(Debug, Clone)]
struct MappedResource {
    id: ResourceIdentifier,
    singular: String,
    short_names: Vec<String>,
}

impl MappedResource {
    fn matches(&self, name: &str) -> bool {
        self.id.resource == name
            || self.singular == name
            || self.id.kind.to_ascii_lowercase() == name
            || self.short_names.iter().any(|short| short == name)
    }
}

/// Type registry assembled from the cluster's discovery documents.
///
/// Entries keep the order they were added in: callers add the core group
/// first, then the remaining groups in discovery order, each with its
/// preferred version ahead of the others. The first match wins.
#[derive(Debug, Clone, Default)]
pub struct RestMapper {
    entries: Vec<MappedResource>,
}

impl RestMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group_version(&mut self, group: &str, version: &str, resources: &[APIResource]) {
        for resource in resources {
            if resource.name.contains('/') {
                continue;
            }
            if !resource.verbs.iter().any(|verb| verb == "list") {
                continue;
            }

            self.entries.push(MappedResource {
                id: ResourceIdentifier {
                    group: group.to_string(),
                    version: version.to_string(),
                    resource: resource.name.to_ascii_lowercase(),
                    kind: resource.kind.clone(),
                    namespaced: resource.namespaced,
                },
                singular: resource.singular_name.to_ascii_lowercase(),
                short_names: resource
                    .short_names
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|short| short.to_ascii_lowercase())
                    .collect(),
            });
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl TypeMapper for RestMapper {
    fn resource_for(&self, name: &str, group: Option<&str>) -> Option<ResourceIdentifier> {
        self.entries
            .iter()
            .filter(|entry| group.is_none_or(|group| entry.id.group == group))
            .find(|entry| entry.matches(name))
            .map(|entry| entry.id.clone())
    }
}

pub struct Resolver<'a, M> {
    mapper: &'a M,
    aliases: &'a HashMap<String, String>,
}

impl<'a, M: TypeMapper> Resolver<'a, M> {
    pub fn new(mapper: &'a M, aliases: &'a HashMap<String, String>) -> Self {
        Self { mapper, aliases }
    }

    pub fn resolve(&self, input: &str) -> Result<ResourceIdentifier, PeekError> {
        let mut lowered = input.to_ascii_lowercase();
        if let Some(target) = self.aliases.get(&lowered) {
            lowered = target.to_ascii_lowercase();
        }

        // Only `name` and `name.group` are understood. Anything with more dots
        // goes to the mapper whole and is left to fail there.
        let parts = lowered.split('.').collect::<Vec<_>>();
        let (name, group) = match parts.as_slice() {
            [name, group] => (*name, Some(*group)),
            _ => (lowered.as_str(), None),
        };

        self.mapper
            .resource_for(name, group)
            .ok_or_else(|| PeekError::UnknownResource(input.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Resolver, RestMapper, TypeMapper};
    use crate::error::PeekError;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResource;
    use std::collections::HashMap;

    fn api_resource(name: &str, singular: &str, kind: &str, short: &[&str]) -> APIResource {
        APIResource {
            name: name.to_string(),
            singular_name: singular.to_string(),
            kind: kind.to_string(),
            namespaced: true,
            short_names: if short.is_empty() {
                None
            } else {
                Some(short.iter().map(|value| value.to_string()).collect())
            },
            verbs: vec!["get".to_string(), "list".to_string(), "watch".to_string()],
            ..Default::default()
        }
    }

    fn mapper() -> RestMapper {
        let mut mapper = RestMapper::new();
        let mut nodes = api_resource("nodes", "node", "Node", &["no"]);
        nodes.namespaced = false;
        let mut pod_log = api_resource("pods/log", "", "Pod", &[]);
        pod_log.verbs = vec!["get".to_string()];
        mapper.add_group_version(
            "",
            "v1",
            &[
                api_resource("pods", "pod", "Pod", &["po"]),
                pod_log,
                nodes,
                api_resource("events", "event", "Event", &["ev"]),
            ],
        );
        mapper.add_group_version(
            "apps",
            "v1",
            &[api_resource("deployments", "deployment", "Deployment", &["deploy"])],
        );
        mapper.add_group_version(
            "events.k8s.io",
            "v1",
            &[api_resource("events", "event", "Event", &["ev"])],
        );
        mapper
    }

    #[test]
    fn subresources_and_unlistable_types_are_skipped() {
        assert_eq!(mapper().len(), 5);
    }

    #[test]
    fn resolves_plural_singular_kind_and_short_names() {
        let mapper = mapper();
        let aliases = HashMap::new();
        let resolver = Resolver::new(&mapper, &aliases);

        for input in ["pods", "pod", "Pod", "PO"] {
            let id = resolver.resolve(input).expect("pods resolve");
            assert_eq!(id.resource, "pods");
            assert_eq!(id.group, "");
            assert_eq!(id.version, "v1");
        }

        let nodes = resolver.resolve("no").expect("nodes resolve");
        assert_eq!(nodes.kind, "Node");
        assert!(!nodes.namespaced);
    }

    #[test]
    fn single_dot_selects_the_group() {
        let mapper = mapper();
        let aliases = HashMap::new();
        let resolver = Resolver::new(&mapper, &aliases);

        assert_eq!(resolver.resolve("events").expect("core events").group, "");
        assert_eq!(
            resolver
                .resolve("deployments.apps")
                .expect("deployments")
                .resource,
            "deployments"
        );
        assert!(matches!(
            resolver.resolve("deployments.batch"),
            Err(PeekError::UnknownResource(_))
        ));
    }

    #[test]
    fn multi_dot_input_is_not_split() {
        let mapper = mapper();
        let aliases = HashMap::new();
        let resolver = Resolver::new(&mapper, &aliases);

        // events.k8s.io is registered, but the two-dot form is not understood.
        assert!(mapper.resource_for("events", Some("events.k8s.io")).is_some());
        assert!(resolver.resolve("events.events.k8s.io").is_err());
    }

    #[test]
    fn unknown_resource_names_the_input_verbatim() {
        let mapper = mapper();
        let aliases = HashMap::new();
        let resolver = Resolver::new(&mapper, &aliases);

        let error = resolver
            .resolve("widgets.example.com")
            .expect_err("no widgets registered");
        assert!(matches!(&error, PeekError::UnknownResource(input) if input == "widgets.example.com"));
        assert_eq!(
            error.to_string(),
            "the server doesn't have a resource type \"widgets.example.com\""
        );

        let error = resolver.resolve("Gadgets").expect_err("no gadgets");
        assert!(error.to_string().contains("\"Gadgets\""));
    }

    #[test]
    fn surrounding_whitespace_is_part_of_the_name() {
        let mapper = mapper();
        let aliases = HashMap::new();
        let resolver = Resolver::new(&mapper, &aliases);

        for input in [" pods", "pods ", "\tpo"] {
            let error = resolver.resolve(input).expect_err("whitespace is not stripped");
            assert!(matches!(&error, PeekError::UnknownResource(name) if name == input));
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        let mapper = mapper();
        let aliases = HashMap::new();
        let resolver = Resolver::new(&mapper, &aliases);

        let first = resolver.resolve("deploy").expect("deploy");
        let second = resolver.resolve("deploy").expect("deploy");
        assert_eq!(first, second);
    }

    #[test]
    fn aliases_expand_before_lookup() {
        let mapper = mapper();
        let aliases = HashMap::from([("d".to_string(), "deployments.apps".to_string())]);
        let resolver = Resolver::new(&mapper, &aliases);

        assert_eq!(resolver.resolve("D").expect("alias").group, "apps");
    }
}
