//! Finding collection, net reporting and the result of a comparison run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use netcmp_common::{Finding, FindingKind, GraphIndex};

use crate::builder::PinClass;
use crate::index::{FrozenGraph, Net, NetId};
use crate::listener::Listeners;
use crate::refine::{Label, Partition};

/// Collects findings in discovery order and forwards each one to the
/// registered listeners as soon as it is produced.
pub struct Reporter<'a> {
    trace: bool,
    findings: Vec<Finding>,
    listeners: &'a mut Listeners,
}

impl<'a> Reporter<'a> {
    pub fn new(trace: bool, listeners: &'a mut Listeners) -> Self {
        Self {
            trace,
            findings: Vec::new(),
            listeners,
        }
    }

    pub const fn trace(&self) -> bool {
        self.trace
    }

    /// Records a finding. `General` findings are dropped unless trace mode
    /// is on.
    pub fn emit(&mut self, finding: Finding) {
        if finding.kind == FindingKind::General && !self.trace {
            return;
        }
        self.listeners.dispatch(&finding);
        self.findings.push(finding);
    }

    pub fn general(&mut self, message: impl Into<String>) {
        if self.trace {
            self.emit(Finding::general(message));
        }
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

/// Outcome of one `execute` call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Every emitted finding, in discovery order.
    pub findings: Vec<Finding>,
    /// Refinement rounds run after radius 0.
    pub rounds: usize,
    /// Whether refinement stopped because nothing changed any more, as
    /// opposed to hitting the depth ceiling.
    pub fixpoint: bool,
    /// Final label of every instance, keyed by instance name.
    pub class_assignment: [BTreeMap<String, Label>; 2],
    /// Matched instance pairs, graph 0 name first, sorted.
    pub matches: Vec<(String, String)>,
    /// Number of devices in each graph.
    pub device_counts: [usize; 2],
}

impl Report {
    /// True when every device of both graphs is covered by a match.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.device_counts
            .iter()
            .all(|&count| count == self.matches.len())
    }

    pub fn count(&self, kind: FindingKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    /// The match partner of a graph 0 instance.
    pub fn partner(&self, first: &str) -> Option<&str> {
        self.matches
            .iter()
            .find(|(a, _)| a == first)
            .map(|(_, b)| b.as_str())
    }
}

/// Matched and total connected nets of one graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetTally {
    pub matched: usize,
    pub total: usize,
}

/// How a net relates to the device classification.
#[derive(Debug, PartialEq, Eq)]
enum NetKey {
    /// Every pin lands on a matched device: sorted `(match id, pin class)`.
    Matched(Vec<(u32, PinClass)>),
    /// Touches at least one device without a counterpart.
    Mismatched,
    /// Touches a device that is still pending; not reported.
    Pending,
}

fn net_key(net: &Net, labels: &[Label]) -> NetKey {
    let mut key = Vec::with_capacity(net.connections.len());
    let mut mismatched = false;
    for &(device, class) in &net.connections {
        match labels[device] {
            Label::Matched(id) => key.push((id, class)),
            Label::Mismatched => mismatched = true,
            Label::Class(_) => return NetKey::Pending,
        }
    }
    if mismatched {
        return NetKey::Mismatched;
    }
    key.sort_unstable();
    NetKey::Matched(key)
}

/// Reports the nets of both graphs and returns how many of them matched.
///
/// Two nets match when their pins land on the same matched devices through
/// the same pin classes. Matches are emitted first in graph 0 name order,
/// then every net without a counterpart, per graph in name order. Nets on
/// pending devices are left to the symmetry findings of those devices.
pub fn report_nets(
    graphs: &[FrozenGraph; 2],
    partition: &Partition,
    graph_names: &[String; 2],
    reporter: &mut Reporter<'_>,
) -> [NetTally; 2] {
    let keys: [Vec<NetKey>; 2] = GraphIndex::BOTH.map(|g| {
        let labels = partition.labels(g);
        graphs[g.as_usize()]
            .nets
            .iter()
            .map(|net| net_key(net, labels))
            .collect()
    });

    let mut by_key: [BTreeMap<&Vec<(u32, PinClass)>, Vec<NetId>>; 2] = Default::default();
    let mut unpaired: [Vec<NetId>; 2] = Default::default();
    for g in GraphIndex::BOTH {
        let i = g.as_usize();
        for (net, key) in keys[i].iter().enumerate() {
            match key {
                NetKey::Matched(key) => by_key[i].entry(key).or_default().push(net),
                NetKey::Mismatched => unpaired[i].push(net),
                NetKey::Pending => {}
            }
        }
    }

    let mut pairs = Vec::new();
    for (key, mut first) in std::mem::take(&mut by_key[0]) {
        let mut second = by_key[1].remove(&key).unwrap_or_default();
        sort_by_name(&graphs[0], &mut first);
        sort_by_name(&graphs[1], &mut second);
        let paired = first.len().min(second.len());
        pairs.extend(first.iter().copied().zip(second.iter().copied()));
        unpaired[0].extend_from_slice(&first[paired..]);
        unpaired[1].extend_from_slice(&second[paired..]);
    }
    for nets in by_key[1].values() {
        unpaired[1].extend_from_slice(nets);
    }

    pairs.sort_by(|a, b| graphs[0].nets[a.0].name.cmp(&graphs[0].nets[b.0].name));
    for &(a, b) in &pairs {
        let vertices = vec![graphs[0].net_vertex(a), graphs[1].net_vertex(b)];
        let message = format!("net {} matches net {}", vertices[0].name, vertices[1].name);
        reporter.emit(Finding::net(FindingKind::Match, None, message, vertices));
    }
    for g in GraphIndex::BOTH {
        let i = g.as_usize();
        sort_by_name(&graphs[i], &mut unpaired[i]);
        for &net in &unpaired[i] {
            let vertex = graphs[i].net_vertex(net);
            let message = format!(
                "net {} in {} has no counterpart in {}",
                vertex.name,
                graph_names[i],
                graph_names[g.other().as_usize()]
            );
            reporter.emit(Finding::net(
                FindingKind::MismatchOther,
                Some(g),
                message,
                vec![vertex],
            ));
        }
    }

    GraphIndex::BOTH.map(|g| NetTally {
        matched: pairs.len(),
        total: graphs[g.as_usize()].net_count(),
    })
}

fn sort_by_name(graph: &FrozenGraph, nets: &mut [NetId]) {
    nets.sort_by(|&a, &b| graph.nets[a].name.cmp(&graph.nets[b].name));
}
