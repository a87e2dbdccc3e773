use indexmap::IndexMap;
use netcmp_common::{CompareError, GraphIndex, Payload};

use super::net_aliases::NetNode;

/// A declared device instance, before alias resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceDecl {
    /// Name as declared.
    pub name: String,
    /// Lookup key of the template.
    pub template: String,
    /// Net of each template pin, as nodes of the graph's alias forest.
    pub nets: Vec<NetNode>,
    pub payload: Option<Payload>,
}

/// Instances of one graph keyed by lookup name, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct InstanceRegistry {
    instances: IndexMap<String, InstanceDecl>,
}

impl InstanceRegistry {
    pub fn contains(&self, key: &str) -> bool {
        self.instances.contains_key(key)
    }

    /// Fails if the name is taken. Callers check this before creating any
    /// net nodes for the instance.
    pub fn ensure_free(&self, graph: GraphIndex, key: &str, name: &str) -> Result<(), CompareError> {
        if self.contains(key) {
            return Err(CompareError::DuplicateInstance {
                graph,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    #[contracts::debug_requires(!self.contains(&key))]
    pub fn insert(&mut self, key: String, decl: InstanceDecl) {
        self.instances.insert(key, decl);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InstanceDecl)> {
        self.instances.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
