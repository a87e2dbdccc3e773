//! Iterative partition refinement over both graphs at once.
//!
//! A round first summarises every net by the sorted labels of the pins on
//! it, leaving out devices already proven to have no counterpart. It then
//! gives every pending device the signature
//! `(label, sorted (pin class, net summary) per pin)`. Signatures of both
//! graphs are numbered together in sorted order, so equal content in either
//! graph lands in the same class and the numbering never depends on the
//! order things were declared in.

use std::collections::BTreeMap;

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use netcmp_common::{CompareError, GraphIndex};

use crate::Timer;
use crate::builder::PinClass;
use crate::index::{DeviceId, FrozenGraph};

/// Working label of a device.
///
/// Declaration order matters: the derived `Ord` is part of every signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Proven to have no counterpart. Such devices are left out of every net
    /// summary, so a mismatch never spreads to its neighbours.
    Mismatched,
    /// One half of a confirmed pair; the other half carries the same id.
    Matched(u32),
    /// Still pending, in this equivalence class.
    Class(u32),
}

impl Label {
    pub const fn class(self) -> Option<u32> {
        match self {
            Self::Class(c) => Some(c),
            _ => None,
        }
    }
}

/// Members of one pending class, split by graph.
pub type ClassMembers = [Vec<DeviceId>; 2];

/// Labels of every device of both graphs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    labels: [Vec<Label>; 2],
}

impl Partition {
    pub const fn new(labels: [Vec<Label>; 2]) -> Self {
        Self { labels }
    }

    pub fn label(&self, graph: GraphIndex, device: DeviceId) -> Label {
        self.labels[graph.as_usize()][device]
    }

    pub fn labels(&self, graph: GraphIndex) -> &[Label] {
        &self.labels[graph.as_usize()]
    }

    #[contracts::debug_requires(device < self.labels[graph.as_usize()].len())]
    #[contracts::debug_requires(self.label(graph, device).class().is_some(), "only pending devices are settled")]
    pub fn settle(&mut self, graph: GraphIndex, device: DeviceId, label: Label) {
        self.labels[graph.as_usize()][device] = label;
    }

    /// Turns one half of a rejected match into a mismatch.
    #[contracts::debug_requires(matches!(self.label(graph, device), Label::Matched(_)))]
    pub fn unmatch(&mut self, graph: GraphIndex, device: DeviceId) {
        self.labels[graph.as_usize()][device] = Label::Mismatched;
    }

    /// Pending classes in class id order.
    pub fn pending_classes(&self) -> BTreeMap<u32, ClassMembers> {
        let mut classes: BTreeMap<u32, ClassMembers> = BTreeMap::new();
        for graph in GraphIndex::BOTH {
            for (device, label) in self.labels(graph).iter().enumerate() {
                if let Some(class) = label.class() {
                    classes.entry(class).or_default()[graph.as_usize()].push(device);
                }
            }
        }
        classes
    }

    pub fn pending_class_count(&self) -> usize {
        self.pending_classes().len()
    }

    pub fn has_pending(&self) -> bool {
        self.labels
            .iter()
            .any(|labels| labels.iter().any(|l| l.class().is_some()))
    }
}

/// Summary of a net: the sorted label and pin class of every pin on it,
/// mismatched devices left out.
pub type NetContent = Vec<(Label, PinClass)>;
type DeviceSignature = (Label, Vec<(PinClass, u32)>);

/// Runs one refinement round and returns the number of pending classes
/// after it.
///
/// Only pending devices are relabelled; settled labels are read but never
/// changed. Fails if the round would merge two previously distinct classes.
pub fn refine_round(
    graphs: &[FrozenGraph; 2],
    partition: &mut Partition,
    parallel: bool,
) -> Result<usize, CompareError> {
    let _t = Timer::new("refine::refine_round");

    let contents: [Vec<NetContent>; 2] =
        GraphIndex::BOTH.map(|g| net_contents(&graphs[g.as_usize()], partition, parallel));
    let mut net_classes: BTreeMap<&NetContent, u32> = BTreeMap::new();
    for content in contents.iter().flatten() {
        net_classes.insert(content, 0);
    }
    for (id, class) in net_classes.values_mut().enumerate() {
        *class = id as u32;
    }
    let net_ids: [Vec<u32>; 2] = contents.each_ref().map(|per_graph| {
        per_graph
            .iter()
            .map(|content| net_classes.get(content).copied().unwrap_or_default())
            .collect()
    });

    let signatures: [Vec<Option<DeviceSignature>>; 2] = GraphIndex::BOTH.map(|g| {
        device_signatures(
            &graphs[g.as_usize()],
            partition.labels(g),
            &net_ids[g.as_usize()],
            parallel,
        )
    });

    let mut classes: BTreeMap<&DeviceSignature, u32> = BTreeMap::new();
    for signature in signatures.iter().flatten().flatten() {
        classes.insert(signature, 0);
    }
    for (id, class) in classes.values_mut().enumerate() {
        *class = id as u32;
    }

    // Every new class must descend from exactly one old class.
    let mut parent: BTreeMap<u32, (Label, GraphIndex, DeviceId)> = BTreeMap::new();
    let mut relabelled: Vec<(GraphIndex, DeviceId, Label)> = Vec::new();
    for graph in GraphIndex::BOTH {
        for (device, signature) in signatures[graph.as_usize()].iter().enumerate() {
            let Some(signature) = signature else {
                continue;
            };
            let class = classes.get(signature).copied().unwrap_or_default();
            let old = partition.label(graph, device);
            match parent.get(&class) {
                Some(&(label, other_graph, other)) if label != old => {
                    return Err(CompareError::internal(
                        format!("refinement merged classes {label:?} and {old:?}"),
                        vec![
                            graphs[other_graph.as_usize()].vertex(other).to_string(),
                            graphs[graph.as_usize()].vertex(device).to_string(),
                        ],
                    ));
                }
                Some(_) => {}
                None => {
                    parent.insert(class, (old, graph, device));
                }
            }
            relabelled.push((graph, device, Label::Class(class)));
        }
    }

    for (graph, device, label) in relabelled {
        partition.labels[graph.as_usize()][device] = label;
    }
    Ok(classes.len())
}

/// Content of every net of `graph` under the current labels.
pub fn net_contents(graph: &FrozenGraph, partition: &Partition, parallel: bool) -> Vec<NetContent> {
    let labels = partition.labels(graph.graph);
    let content = |net: &crate::index::Net| -> NetContent {
        let mut out: NetContent = net
            .connections
            .iter()
            .map(|&(device, class)| (labels[device], class))
            .filter(|(label, _)| *label != Label::Mismatched)
            .collect();
        out.sort_unstable();
        out
    };

    #[cfg(feature = "rayon")]
    if parallel {
        return graph.nets.par_iter().map(content).collect();
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    graph.nets.iter().map(content).collect()
}

fn device_signatures(
    graph: &FrozenGraph,
    labels: &[Label],
    net_ids: &[u32],
    parallel: bool,
) -> Vec<Option<DeviceSignature>> {
    let signature = |(device, label): (usize, &Label)| -> Option<DeviceSignature> {
        label.class()?;
        let mut pins: Vec<(PinClass, u32)> = graph.devices[device]
            .pins
            .iter()
            .map(|&(net, class)| (class, net_ids[net]))
            .collect();
        pins.sort_unstable();
        Some((*label, pins))
    };

    #[cfg(feature = "rayon")]
    if parallel {
        return labels.par_iter().enumerate().map(signature).collect();
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    labels.iter().enumerate().map(signature).collect()
}
