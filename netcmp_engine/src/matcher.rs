//! Pairs pending classes across the graphs.
//!
//! After radius 0 and after every refinement round each pending class is
//! inspected:
//! - one device per graph: a candidate match;
//! - no device in one graph: every present device is a mismatch;
//! - several candidates: once the classes are stable, equate hints inside
//!   the class are applied and the residue is re-examined by the two rules
//!   above or left pending.
//!
//! Candidate matches are only reported once refinement has ended and both
//! halves of the pair see the same net contents on every pin. Classes still
//! pending at that point are reported as symmetric.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use tracing::trace;

use netcmp_common::{Finding, FindingKind, GraphIndex, VertexRef};

use crate::builder::{EquateDecl, PinClass};
use crate::index::{DeviceId, FrozenGraph};
use crate::refine::{Label, NetContent, Partition, net_contents};
use crate::report::Reporter;

/// Validated equate hints.
#[derive(Clone, Debug, Default)]
pub struct EquateTable {
    /// Ordered by graph 0 instance name.
    pairs: Vec<(DeviceId, DeviceId)>,
    partner: HashMap<DeviceId, DeviceId>,
}

impl EquateTable {
    /// Resolves the declared hints against the frozen graphs. Hints naming
    /// an unknown instance, or an instance already named by an earlier hint,
    /// are reported as `Bad` and dropped.
    pub fn build(
        decls: &[EquateDecl],
        graphs: &[FrozenGraph; 2],
        key: impl Fn(&str) -> String,
        graph_names: &[String; 2],
        reporter: &mut Reporter<'_>,
    ) -> Self {
        let mut table = Self::default();
        let mut used: [HashSet<DeviceId>; 2] = Default::default();

        for decl in decls.iter().sorted() {
            let names = [decl.first.as_str(), decl.second.as_str()];
            let ids = GraphIndex::BOTH
                .map(|g| graphs[g.as_usize()].device_by_key(&key(names[g.as_usize()])));

            let mut problem = None;
            for g in GraphIndex::BOTH {
                let i = g.as_usize();
                match ids[i] {
                    None => {
                        problem = Some(format!(
                            "equate {}/{}: no instance {} in {}",
                            names[0], names[1], names[i], graph_names[i]
                        ));
                    }
                    Some(id) if used[i].contains(&id) => {
                        problem = Some(format!(
                            "equate {}/{}: duplicate equivalence name {} in {}",
                            names[0], names[1], names[i], graph_names[i]
                        ));
                    }
                    Some(_) => continue,
                }
                break;
            }

            match ids {
                [Some(a), Some(b)] if problem.is_none() => {
                    used[0].insert(a);
                    used[1].insert(b);
                    table.pairs.push((a, b));
                    table.partner.insert(a, b);
                }
                _ => {
                    let vertices = GraphIndex::BOTH
                        .iter()
                        .filter_map(|&g| {
                            ids[g.as_usize()].map(|d| graphs[g.as_usize()].vertex(d))
                        })
                        .collect();
                    let message = problem.unwrap_or_default();
                    reporter.emit(Finding::device(FindingKind::Bad, None, message, vertices));
                }
            }
        }
        table
    }

    pub fn pairs(&self) -> &[(DeviceId, DeviceId)] {
        &self.pairs
    }

    pub fn partner(&self, first: DeviceId) -> Option<DeviceId> {
        self.partner.get(&first).copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

pub struct Matcher {
    equates: EquateTable,
    graph_names: [String; 2],
    next_match: u32,
    matches: Vec<(DeviceId, DeviceId)>,
}

impl Matcher {
    pub fn new(equates: EquateTable, graph_names: [String; 2]) -> Self {
        Self {
            equates,
            graph_names,
            next_match: 0,
            matches: Vec::new(),
        }
    }

    pub fn matches(&self) -> &[(DeviceId, DeviceId)] {
        &self.matches
    }

    /// Settles every class that can be decided now and returns the number of
    /// devices settled. Equate hints are only consulted with `apply_hints`,
    /// which the caller sets once the classes stopped splitting.
    pub fn settle(
        &mut self,
        graphs: &[FrozenGraph; 2],
        partition: &mut Partition,
        reporter: &mut Reporter<'_>,
        apply_hints: bool,
    ) -> usize {
        let mut settled = 0;
        for (class, members) in partition.pending_classes() {
            let [mut first, mut second] = members;
            sort_by_name(&graphs[0], &mut first);
            sort_by_name(&graphs[1], &mut second);

            if apply_hints
                && (first.len() > 1 || second.len() > 1)
                && !first.is_empty()
                && !second.is_empty()
            {
                let hinted: Vec<(DeviceId, DeviceId)> = first
                    .iter()
                    .filter_map(|&a| self.equates.partner(a).map(|b| (a, b)))
                    .filter(|(_, b)| second.contains(b))
                    .collect();
                for &(a, b) in &hinted {
                    trace!(
                        "class {}: equate hint pairs {} and {}",
                        class, graphs[0].devices[a].name, graphs[1].devices[b].name
                    );
                    self.record_match(partition, a, b);
                    settled += 2;
                }
                first.retain(|d| !hinted.iter().any(|&(a, _)| a == *d));
                second.retain(|d| !hinted.iter().any(|&(_, b)| b == *d));
            }

            match (first.as_slice(), second.as_slice()) {
                ([a], [b]) => {
                    trace!("class {}: unique pair", class);
                    self.record_match(partition, *a, *b);
                    settled += 2;
                }
                ([], others) | (others, []) => {
                    let graph = if first.is_empty() {
                        GraphIndex::Second
                    } else {
                        GraphIndex::First
                    };
                    for &device in others {
                        self.record_mismatch(graphs, partition, reporter, graph, device);
                        settled += 1;
                    }
                }
                _ => {}
            }
        }
        settled
    }

    fn record_match(&mut self, partition: &mut Partition, a: DeviceId, b: DeviceId) {
        let label = Label::Matched(self.next_match);
        self.next_match += 1;
        partition.settle(GraphIndex::First, a, label);
        partition.settle(GraphIndex::Second, b, label);
        self.matches.push((a, b));
    }

    fn record_mismatch(
        &self,
        graphs: &[FrozenGraph; 2],
        partition: &mut Partition,
        reporter: &mut Reporter<'_>,
        graph: GraphIndex,
        device: DeviceId,
    ) {
        partition.settle(graph, device, Label::Mismatched);
        let vertex = graphs[graph.as_usize()].vertex(device);
        let message = format!(
            "{} in {} has no counterpart in {}",
            vertex.name,
            self.graph_names[graph.as_usize()],
            self.graph_names[graph.other().as_usize()]
        );
        reporter.emit(Finding::device(
            FindingKind::MismatchOther,
            Some(graph),
            message,
            vec![vertex],
        ));
    }

    /// Checks every candidate pair against its final neighbourhood and
    /// reports it as a match or as two mismatches. Then reports every class
    /// still pending as symmetric, and every equate hint whose instances did
    /// not end up matched to each other.
    pub fn finish(
        &mut self,
        graphs: &[FrozenGraph; 2],
        partition: &mut Partition,
        reporter: &mut Reporter<'_>,
    ) {
        let contents =
            GraphIndex::BOTH.map(|g| net_contents(&graphs[g.as_usize()], &*partition, false));
        let candidates = std::mem::take(&mut self.matches);
        let mut rejected = Vec::new();
        for (a, b) in candidates {
            let agree = pin_profile(&graphs[0], &contents[0], a)
                == pin_profile(&graphs[1], &contents[1], b);
            if agree {
                self.matches.push((a, b));
                let vertices = vec![graphs[0].vertex(a), graphs[1].vertex(b)];
                let message = format!("{} matches {}", vertices[0].name, vertices[1].name);
                reporter.emit(Finding::device(FindingKind::Match, None, message, vertices));
            } else {
                trace!(
                    "pair {} / {} differs in its connections",
                    graphs[0].devices[a].name, graphs[1].devices[b].name
                );
                rejected.push((a, b));
            }
        }
        for (a, b) in rejected {
            partition.unmatch(GraphIndex::First, a);
            partition.unmatch(GraphIndex::Second, b);
            for (graph, device, partner) in
                [(GraphIndex::First, a, b), (GraphIndex::Second, b, a)]
            {
                let vertex = graphs[graph.as_usize()].vertex(device);
                let message = format!(
                    "{} in {} has the type of {} in {} but not its connections",
                    vertex.name,
                    self.graph_names[graph.as_usize()],
                    graphs[graph.other().as_usize()].devices[partner].name,
                    self.graph_names[graph.other().as_usize()]
                );
                reporter.emit(Finding::device(
                    FindingKind::MismatchOther,
                    Some(graph),
                    message,
                    vec![vertex],
                ));
            }
        }

        for members in partition.pending_classes().into_values() {
            let vertices: Vec<VertexRef> = GraphIndex::BOTH
                .iter()
                .flat_map(|&g| {
                    members[g.as_usize()]
                        .iter()
                        .map(move |&d| graphs[g.as_usize()].vertex(d))
                })
                .sorted()
                .collect();
            let message = format!(
                "{} devices could not be told apart: {}",
                vertices.len(),
                vertices.iter().join(", ")
            );
            reporter.emit(Finding::device(
                FindingKind::MismatchSymmetry,
                None,
                message,
                vertices,
            ));
        }

        let matched: HashSet<&(DeviceId, DeviceId)> = self.matches.iter().collect();
        for pair @ &(a, b) in self.equates.pairs() {
            if matched.contains(pair) {
                continue;
            }
            let vertices = vec![graphs[0].vertex(a), graphs[1].vertex(b)];
            let message = format!(
                "equate {}/{}: instances were not matched to each other",
                vertices[0].name, vertices[1].name
            );
            reporter.emit(Finding::device(FindingKind::Bad, None, message, vertices));
        }
    }
}

/// Pin classes of a device with the content of the net at each pin, sorted so
/// that interchangeable pins compare equal in any order.
fn pin_profile<'a>(
    graph: &FrozenGraph,
    contents: &'a [NetContent],
    device: DeviceId,
) -> Vec<(PinClass, &'a NetContent)> {
    graph.devices[device]
        .pins
        .iter()
        .map(|&(net, class)| (class, &contents[net]))
        .sorted()
        .collect()
}

fn sort_by_name(graph: &FrozenGraph, devices: &mut [DeviceId]) {
    devices.sort_by(|&a, &b| graph.devices[a].name.cmp(&graph.devices[b].name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::classify::classify;
    use crate::listener::Listeners;

    fn parallel_pair(hints: &[(&str, &str)]) -> (GraphBuilder, [FrozenGraph; 2]) {
        let mut b = GraphBuilder::new(false);
        b.define_template("res", &["a", "b"]).unwrap();
        for graph in GraphIndex::BOTH {
            b.define_instance(graph, "res", "R1", &["p", "q"], None).unwrap();
            b.define_instance(graph, "res", "R2", &["p", "q"], None).unwrap();
        }
        for (x, y) in hints {
            b.define_equate(x, y).unwrap();
        }
        let graphs = GraphIndex::BOTH.map(|g| FrozenGraph::build(&b, g));
        (b, graphs)
    }

    fn names() -> [String; 2] {
        ["g0".to_string(), "g1".to_string()]
    }

    #[test]
    fn test_hint_resolves_symmetric_pair() {
        let (b, graphs) = parallel_pair(&[("R2", "R1")]);
        let mut listeners = Listeners::default();
        let mut reporter = Reporter::new(false, &mut listeners);
        let table = EquateTable::build(b.equates(), &graphs, |n| n.to_string(), &names(), &mut reporter);
        assert_eq!(table.len(), 1);

        let mut partition = classify(&graphs);
        let mut matcher = Matcher::new(table, names());
        assert_eq!(matcher.settle(&graphs, &mut partition, &mut reporter, false), 0);
        assert_eq!(matcher.settle(&graphs, &mut partition, &mut reporter, true), 4);
        assert!(!partition.has_pending());
        assert_eq!(matcher.matches(), &[(1, 0), (0, 1)]);
    }

    #[test]
    fn test_symmetry_without_hint() {
        let (_, graphs) = parallel_pair(&[]);
        let mut listeners = Listeners::default();
        let mut reporter = Reporter::new(false, &mut listeners);
        let mut partition = classify(&graphs);
        let mut matcher = Matcher::new(EquateTable::default(), names());

        assert_eq!(matcher.settle(&graphs, &mut partition, &mut reporter, true), 0);
        matcher.finish(&graphs, &mut partition, &mut reporter);
        let findings = reporter.into_findings();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::MismatchSymmetry);
        assert_eq!(findings[0].vertices.len(), 4);
        assert_eq!(findings[0].graph, None);
    }

    #[test]
    fn test_unique_pair_with_different_neighbours_is_rejected() {
        let mut b = GraphBuilder::new(false);
        b.define_template("inv", &["in", "out"]).unwrap();
        b.define_template("buf", &["in", "out"]).unwrap();
        for graph in GraphIndex::BOTH {
            b.define_instance(graph, "inv", "U1", &["a", "b"], None).unwrap();
        }
        b.define_instance(GraphIndex::First, "buf", "U2", &["b", "c"], None).unwrap();
        b.define_instance(GraphIndex::Second, "buf", "U2", &["c", "d"], None).unwrap();
        let graphs = GraphIndex::BOTH.map(|g| FrozenGraph::build(&b, g));

        let mut listeners = Listeners::default();
        let mut reporter = Reporter::new(false, &mut listeners);
        let mut partition = classify(&graphs);
        let mut matcher = Matcher::new(EquateTable::default(), names());
        assert_eq!(matcher.settle(&graphs, &mut partition, &mut reporter, true), 4);
        matcher.finish(&graphs, &mut partition, &mut reporter);

        assert!(matcher.matches().is_empty());
        let findings = reporter.into_findings();
        assert_eq!(findings.len(), 4);
        assert!(findings.iter().all(|f| f.kind == FindingKind::MismatchOther));
        assert_eq!(partition.label(GraphIndex::First, 0), Label::Mismatched);
        assert_eq!(partition.label(GraphIndex::Second, 1), Label::Mismatched);
    }

    #[test]
    fn test_unknown_and_duplicate_hints_are_bad() {
        let (b, graphs) = parallel_pair(&[("R1", "R1"), ("R1", "R2"), ("R9", "R2")]);
        let mut listeners = Listeners::default();
        let mut reporter = Reporter::new(false, &mut listeners);
        let table = EquateTable::build(b.equates(), &graphs, |n| n.to_string(), &names(), &mut reporter);

        assert_eq!(table.pairs(), &[(0, 0)]);
        let findings = reporter.into_findings();
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.kind == FindingKind::Bad));
        assert!(findings[1].message.contains("no instance R9"));
    }
}
