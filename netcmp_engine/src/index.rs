//! Read-only view of one declared graph, built when a comparison starts.
//!
//! Net names are resolved through their alias closures here, so aliases
//! declared after the instances that use them are honoured.

use std::collections::HashMap;

use netcmp_common::{GraphIndex, VertexRef};

use crate::Timer;
use crate::builder::{GraphBuilder, PinClass};

/// Position of a device in [`FrozenGraph::devices`].
pub type DeviceId = usize;
/// Position of a net in [`FrozenGraph::nets`].
pub type NetId = usize;

#[derive(Clone, Debug)]
pub struct Device {
    pub name: String,
    /// Lookup key of the template.
    pub template: String,
    pub payload: Option<netcmp_common::Payload>,
    /// One entry per template pin.
    pub pins: Vec<(NetId, PinClass)>,
}

#[derive(Clone, Debug)]
pub struct Net {
    pub name: String,
    /// Every pin landing on this net.
    pub connections: Vec<(DeviceId, PinClass)>,
}

#[derive(Clone, Debug)]
pub struct FrozenGraph {
    pub graph: GraphIndex,
    pub devices: Vec<Device>,
    /// Alias closures with at least one connection.
    pub nets: Vec<Net>,
    /// Display names of closures nothing connects to, sorted.
    pub unconnected: Vec<String>,
    by_key: HashMap<String, DeviceId>,
}

impl FrozenGraph {
    pub fn build(builder: &GraphBuilder, graph: GraphIndex) -> Self {
        let _t = Timer::new("FrozenGraph::build");

        let decl = builder.graph(graph);
        let closure_names = decl.nets.closure_names();
        let mut net_of_root: HashMap<usize, NetId> = HashMap::with_capacity(decl.nets.len());
        let mut nets: Vec<Net> = Vec::new();
        let mut devices = Vec::with_capacity(decl.instances.len());
        let mut by_key = HashMap::with_capacity(decl.instances.len());

        for (key, inst) in decl.instances.iter() {
            let id = devices.len();
            let pin_classes = builder
                .templates()
                .get(&inst.template)
                .map(|t| t.pin_classes.as_slice())
                .unwrap_or_default();

            let pins = inst
                .nets
                .iter()
                .zip(pin_classes)
                .map(|(&node, &class)| {
                    let root = decl.nets.find(node);
                    let net = *net_of_root.entry(root).or_insert_with(|| {
                        nets.push(Net {
                            name: closure_names
                                .get(&root)
                                .map_or_else(String::new, |n| n.to_string()),
                            connections: Vec::new(),
                        });
                        nets.len() - 1
                    });
                    nets[net].connections.push((id, class));
                    (net, class)
                })
                .collect();

            by_key.insert(key.to_string(), id);
            devices.push(Device {
                name: inst.name.clone(),
                template: inst.template.clone(),
                payload: inst.payload,
                pins,
            });
        }

        let mut unconnected: Vec<String> = closure_names
            .iter()
            .filter(|(root, _)| !net_of_root.contains_key(*root))
            .map(|(_, name)| name.to_string())
            .collect();
        unconnected.sort_unstable();

        Self {
            graph,
            devices,
            nets,
            unconnected,
            by_key,
        }
    }

    pub fn device_by_key(&self, key: &str) -> Option<DeviceId> {
        self.by_key.get(key).copied()
    }

    pub fn vertex(&self, device: DeviceId) -> VertexRef {
        let d = &self.devices[device];
        VertexRef {
            graph: self.graph,
            name: d.name.clone(),
            payload: d.payload,
        }
    }

    pub fn net_vertex(&self, net: NetId) -> VertexRef {
        VertexRef::new(self.graph, &self.nets[net].name)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn net_count(&self) -> usize {
        self.nets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_declared_after_use_is_resolved() {
        let mut b = GraphBuilder::new(false);
        b.define_template("inv", &["in", "out"]).unwrap();
        b.define_instance(GraphIndex::First, "inv", "U1", &["a", "b"], None)
            .unwrap();
        b.define_instance(GraphIndex::First, "inv", "U2", &["b2", "c"], None)
            .unwrap();
        b.define_net_alias(GraphIndex::First, "b", &["b2"]).unwrap();

        let g = FrozenGraph::build(&b, GraphIndex::First);
        assert_eq!(g.net_count(), 3);
        assert_eq!(g.devices[0].pins[1].0, g.devices[1].pins[0].0);
        assert_eq!(g.nets[g.devices[1].pins[0].0].name, "b");
    }

    #[test]
    fn test_unconnected_closures_are_listed() {
        let mut b = GraphBuilder::new(false);
        b.define_template("res", &["a", "b"]).unwrap();
        b.define_instance(GraphIndex::Second, "res", "R1", &["p", "q"], None)
            .unwrap();
        b.define_net_alias(GraphIndex::Second, "spare", &["spare2"])
            .unwrap();

        let g = FrozenGraph::build(&b, GraphIndex::Second);
        assert_eq!(g.unconnected, vec!["spare".to_string()]);
        assert_eq!(g.device_by_key("R1"), Some(0));
    }

    #[test]
    fn test_connections_carry_pin_classes() {
        let mut b = GraphBuilder::new(false);
        b.define_template("nfet", &["sd", "g", "sd"]).unwrap();
        b.define_instance(GraphIndex::First, "nfet", "T1", &["x", "g", "x"], None)
            .unwrap();

        let g = FrozenGraph::build(&b, GraphIndex::First);
        assert_eq!(g.net_count(), 2);
        let x = g.devices[0].pins[0].0;
        assert_eq!(g.nets[x].connections, vec![(0, 0), (0, 0)]);
    }
}
