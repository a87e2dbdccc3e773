//! Declaration phase: accumulates templates, instances, net aliases and
//! equate hints for both graphs.
//!
//! Every operation validates its input completely before mutating, so a
//! failed declaration leaves the builder exactly as it was.

mod instance_registry;
mod net_aliases;
mod template_registry;

pub use instance_registry::{InstanceDecl, InstanceRegistry};
pub use net_aliases::{NetAliases, NetNode};
pub use template_registry::{PinClass, Template, TemplateRegistry};

use netcmp_common::{CompareError, GraphIndex, Payload};
use tracing::trace;

/// Declarations for one graph.
#[derive(Clone, Debug, Default)]
pub struct GraphDecl {
    pub nets: NetAliases,
    pub instances: InstanceRegistry,
}

/// A user hint pairing an instance of graph 0 with one of graph 1.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct EquateDecl {
    pub first: String,
    pub second: String,
}

#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    ignore_case: bool,
    templates: TemplateRegistry,
    graphs: [GraphDecl; 2],
    equates: Vec<EquateDecl>,
}

impl GraphBuilder {
    pub fn new(ignore_case: bool) -> Self {
        Self {
            ignore_case,
            ..Default::default()
        }
    }

    /// Lookup key for a name under this builder's case rule.
    pub fn name_key(&self, name: &str) -> String {
        if self.ignore_case {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn graph(&self, graph: GraphIndex) -> &GraphDecl {
        &self.graphs[graph.as_usize()]
    }

    pub fn equates(&self) -> &[EquateDecl] {
        &self.equates
    }

    pub fn define_template<S: AsRef<str>>(
        &mut self,
        name: &str,
        pins: &[S],
    ) -> Result<(), CompareError> {
        non_empty(name, "template")?;
        for pin in pins {
            non_empty(pin.as_ref(), "pin")?;
        }
        let pin_names: Vec<String> = pins.iter().map(|p| p.as_ref().to_string()).collect();
        let pin_keys: Vec<String> = pin_names.iter().map(|p| self.name_key(p)).collect();

        let key = self.name_key(name);
        self.templates.define(key, name, pin_names, &pin_keys)?;
        trace!("template {} with {} pins", name, pins.len());
        Ok(())
    }

    pub fn define_instance<S: AsRef<str>>(
        &mut self,
        graph: GraphIndex,
        template: &str,
        name: &str,
        nets: &[S],
        payload: Option<Payload>,
    ) -> Result<(), CompareError> {
        non_empty(template, "template")?;
        non_empty(name, "instance")?;
        for net in nets {
            non_empty(net.as_ref(), "net")?;
        }

        let template_key = self.name_key(template);
        let expected = self
            .templates
            .get(&template_key)
            .ok_or_else(|| CompareError::UnknownTemplate {
                name: template.to_string(),
            })?
            .pin_count();
        if expected != nets.len() {
            return Err(CompareError::ArityMismatch {
                template: template.to_string(),
                expected,
                found: nets.len(),
            });
        }
        let key = self.name_key(name);
        self.graphs[graph.as_usize()]
            .instances
            .ensure_free(graph, &key, name)?;

        let net_keys: Vec<String> = nets.iter().map(|n| self.name_key(n.as_ref())).collect();
        let decl = &mut self.graphs[graph.as_usize()];
        let nodes = nets
            .iter()
            .zip(&net_keys)
            .map(|(net, net_key)| decl.nets.node(net_key, net.as_ref()))
            .collect();
        decl.instances.insert(
            key,
            InstanceDecl {
                name: name.to_string(),
                template: template_key,
                nets: nodes,
                payload,
            },
        );
        Ok(())
    }

    pub fn define_net_alias<S: AsRef<str>>(
        &mut self,
        graph: GraphIndex,
        primary: &str,
        aliases: &[S],
    ) -> Result<(), CompareError> {
        non_empty(primary, "net")?;
        for alias in aliases {
            non_empty(alias.as_ref(), "net")?;
        }
        let primary_key = self.name_key(primary);
        let alias_pairs: Vec<(String, String)> = aliases
            .iter()
            .map(|a| (self.name_key(a.as_ref()), a.as_ref().to_string()))
            .collect();

        self.graphs[graph.as_usize()].nets.define_alias(
            graph,
            (&primary_key, primary),
            &alias_pairs,
        )
    }

    pub fn define_equate(&mut self, first: &str, second: &str) -> Result<(), CompareError> {
        non_empty(first, "instance")?;
        non_empty(second, "instance")?;
        self.equates.push(EquateDecl {
            first: first.to_string(),
            second: second.to_string(),
        });
        Ok(())
    }
}

fn non_empty(name: &str, what: &'static str) -> Result<(), CompareError> {
    if name.is_empty() {
        return Err(CompareError::EmptyName { what });
    }
    Ok(())
}
