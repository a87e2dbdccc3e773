//! The comparison engine facade.
//!
//! A [`Compare`] is filled through the `define_*` calls, then run once with
//! [`Compare::execute`]. After a run the declarations are frozen until
//! [`Compare::reset`] returns the engine to the empty declaration state.

use std::collections::BTreeMap;

use tracing::{debug, info};

use netcmp_common::{CompareError, Config, GraphIndex, Payload};

use crate::Timer;
use crate::builder::GraphBuilder;
use crate::classify::classify;
use crate::index::FrozenGraph;
use crate::listener::{CompareListener, ListenerId, Listeners};
use crate::matcher::{EquateTable, Matcher};
use crate::refine::refine_round;
use crate::report::{Report, Reporter, report_nets};

#[derive(Debug)]
pub struct Compare {
    config: Config,
    builder: GraphBuilder,
    listeners: Listeners,
    report: Option<Report>,
    frozen: bool,
}

impl Default for Compare {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl Compare {
    /// Creates an engine with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given settings. `ignore_case` is fixed
    /// from here on.
    pub fn with_config(config: Config) -> Self {
        Self {
            builder: GraphBuilder::new(config.ignore_case),
            config,
            listeners: Listeners::default(),
            report: None,
            frozen: false,
        }
    }

    /// Current settings.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    // === Declarations ===

    /// Declares a device template with its ordered pin names. Repeated pin
    /// names form one group of interchangeable pins.
    ///
    /// # Errors
    /// `DuplicateTemplate` if the name is taken, `EmptyName` for empty
    /// names, `Frozen` after `execute`.
    pub fn define_device_template<S: AsRef<str>>(
        &mut self,
        name: &str,
        pins: &[S],
    ) -> Result<(), CompareError> {
        self.ensure_open()?;
        self.builder.define_template(name, pins)
    }

    /// Declares a device instance in graph `graph` with one net per
    /// template pin.
    ///
    /// # Errors
    /// `InvalidGraphIndex`, `UnknownTemplate`, `ArityMismatch`,
    /// `DuplicateInstance`, `EmptyName` or `Frozen`. The engine is unchanged
    /// after an error.
    pub fn define_instance<S: AsRef<str>>(
        &mut self,
        graph: usize,
        template: &str,
        name: &str,
        nets: &[S],
    ) -> Result<(), CompareError> {
        self.define_instance_inner(graph, template, name, nets, None)
    }

    /// Like [`Compare::define_instance`], attaching a payload that is echoed
    /// back on every finding naming the instance.
    ///
    /// # Errors
    /// As for [`Compare::define_instance`].
    pub fn define_instance_with_payload<S: AsRef<str>>(
        &mut self,
        graph: usize,
        template: &str,
        name: &str,
        nets: &[S],
        payload: Payload,
    ) -> Result<(), CompareError> {
        self.define_instance_inner(graph, template, name, nets, Some(payload))
    }

    fn define_instance_inner<S: AsRef<str>>(
        &mut self,
        graph: usize,
        template: &str,
        name: &str,
        nets: &[S],
        payload: Option<Payload>,
    ) -> Result<(), CompareError> {
        let graph = GraphIndex::try_from(graph)?;
        self.ensure_open()?;
        self.builder
            .define_instance(graph, template, name, nets, payload)
    }

    /// Declares that `primary` and every name in `aliases` are the same net
    /// in graph `graph`.
    ///
    /// # Errors
    /// `ConflictingAlias` if this would merge two nets previously declared
    /// as distinct primaries, `InvalidGraphIndex`, `EmptyName` or `Frozen`.
    pub fn define_net_alias<S: AsRef<str>>(
        &mut self,
        graph: usize,
        primary: &str,
        aliases: &[S],
    ) -> Result<(), CompareError> {
        let graph = GraphIndex::try_from(graph)?;
        self.ensure_open()?;
        self.builder.define_net_alias(graph, primary, aliases)
    }

    /// Hints that instance `first` of graph 0 corresponds to instance
    /// `second` of graph 1. Checked when the comparison runs.
    ///
    /// # Errors
    /// `EmptyName` or `Frozen`.
    pub fn define_equate(&mut self, first: &str, second: &str) -> Result<(), CompareError> {
        self.ensure_open()?;
        self.builder.define_equate(first, second)
    }

    const fn ensure_open(&self) -> Result<(), CompareError> {
        if self.frozen {
            return Err(CompareError::Frozen);
        }
        Ok(())
    }

    // === Settings ===

    /// Sets the maximum number of refinement rounds run after radius 0.
    pub const fn set_max_refinement_depth(&mut self, depth: usize) {
        self.config.max_refinement_depth = depth;
    }

    /// Maximum number of refinement rounds run after radius 0.
    pub const fn max_refinement_depth(&self) -> usize {
        self.config.max_refinement_depth
    }

    /// # Errors
    /// `InvalidGraphIndex` for graph numbers other than 0 and 1.
    pub fn set_graph_name(&mut self, graph: usize, name: &str) -> Result<(), CompareError> {
        let graph = GraphIndex::try_from(graph)?;
        self.config.graph_names[graph.as_usize()] = name.to_string();
        Ok(())
    }

    /// # Errors
    /// `InvalidGraphIndex` for graph numbers other than 0 and 1.
    pub fn graph_name(&self, graph: usize) -> Result<&str, CompareError> {
        let graph = GraphIndex::try_from(graph)?;
        Ok(self.config.graph_name(graph))
    }

    /// Turns the `General` progress findings on or off.
    pub const fn set_trace(&mut self, trace: bool) {
        self.config.trace = trace;
    }

    /// Whether `General` progress findings are emitted.
    pub const fn trace(&self) -> bool {
        self.config.trace
    }

    // === Listeners ===

    /// Registers a listener for every later run. Listeners are called in
    /// registration order and survive [`Compare::reset`].
    pub fn add_listener(&mut self, listener: impl CompareListener + Send + 'static) -> ListenerId {
        self.listeners.add(Box::new(listener))
    }

    /// Unregisters a listener. Returns false if the id is unknown.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // === Execution ===

    /// Runs the comparison and returns its report. Findings reach the
    /// listeners while the run progresses.
    ///
    /// # Errors
    /// `Frozen` if the engine already ran since the last reset, `Internal`
    /// if an algorithm invariant breaks.
    pub fn execute(&mut self) -> Result<&Report, CompareError> {
        self.ensure_open()?;
        self.frozen = true;
        let _t = Timer::new("Compare::execute");

        let graphs = GraphIndex::BOTH.map(|g| FrozenGraph::build(&self.builder, g));
        info!(
            "comparing {} ({} devices, {} nets) with {} ({} devices, {} nets)",
            self.config.graph_names[0],
            graphs[0].device_count(),
            graphs[0].net_count(),
            self.config.graph_names[1],
            graphs[1].device_count(),
            graphs[1].net_count(),
        );

        debug!("{} listeners registered", self.listeners.len());
        let mut reporter = Reporter::new(self.config.trace, &mut self.listeners);
        for g in GraphIndex::BOTH {
            let graph = &graphs[g.as_usize()];
            let name = self.config.graph_name(g);
            reporter.general(format!(
                "{}: {} devices, {} nets",
                name,
                graph.device_count(),
                graph.net_count()
            ));
            for net in &graph.unconnected {
                reporter.general(format!("{name}: ignoring net {net} -- no connection"));
            }
        }

        let builder = &self.builder;
        let equates = EquateTable::build(
            builder.equates(),
            &graphs,
            |n| builder.name_key(n),
            &self.config.graph_names,
            &mut reporter,
        );
        debug!(
            "{} templates, {} usable equate hints",
            builder.templates().len(),
            equates.len()
        );
        let mut matcher = Matcher::new(equates, self.config.graph_names.clone());

        let max_rounds = self.config.max_refinement_depth;
        let mut partition = classify(&graphs);
        let settled = matcher.settle(&graphs, &mut partition, &mut reporter, max_rounds == 0);
        debug!(
            "radius 0: {} classes, {} settled",
            partition.pending_class_count(),
            settled
        );

        // Hints only apply to classes refinement can no longer split.
        let mut rounds = 0;
        let mut fixpoint = !partition.has_pending();
        while !fixpoint && rounds < max_rounds {
            let before = partition.pending_class_count();
            let after = refine_round(&graphs, &mut partition, self.config.parallel)?;
            rounds += 1;
            let stable = after == before;
            let settled = matcher.settle(
                &graphs,
                &mut partition,
                &mut reporter,
                stable || rounds == max_rounds,
            );
            debug!("round {}: {} classes, {} settled", rounds, after, settled);
            reporter.general(format!(
                "pass #{rounds}: {after} classes, {settled} devices settled"
            ));
            fixpoint = (stable && settled == 0) || !partition.has_pending();
        }

        matcher.finish(&graphs, &mut partition, &mut reporter);

        let tallies = report_nets(&graphs, &partition, &self.config.graph_names, &mut reporter);
        if reporter.trace() {
            for g in GraphIndex::BOTH {
                let tally = tallies[g.as_usize()];
                reporter.general(format!(
                    "{}: {} of {} nets matched",
                    self.config.graph_name(g),
                    tally.matched,
                    tally.total
                ));
            }
        }

        let mut matches: Vec<(String, String)> = matcher
            .matches()
            .iter()
            .map(|&(a, b)| {
                (
                    graphs[0].devices[a].name.clone(),
                    graphs[1].devices[b].name.clone(),
                )
            })
            .collect();
        matches.sort_unstable();

        let device_counts = graphs.each_ref().map(FrozenGraph::device_count);
        let passed = device_counts.iter().all(|&c| c == matches.len());
        if passed {
            reporter.general(format!("all devices were matched in {rounds} passes"));
        } else {
            reporter.general("the circuits are different");
        }
        info!(
            "comparison finished after {} rounds: {}",
            rounds,
            if passed { "PASS" } else { "FAIL" }
        );

        let class_assignment = GraphIndex::BOTH.map(|g| {
            graphs[g.as_usize()]
                .devices
                .iter()
                .zip(partition.labels(g))
                .map(|(d, &label)| (d.name.clone(), label))
                .collect::<BTreeMap<_, _>>()
        });

        let report = Report {
            findings: reporter.into_findings(),
            rounds,
            fixpoint,
            class_assignment,
            matches,
            device_counts,
        };
        Ok(&*self.report.insert(report))
    }

    /// Report of the last successful run since the last reset.
    pub const fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Discards every declaration and the last report. Settings and
    /// listeners are kept.
    pub fn reset(&mut self) {
        self.builder = GraphBuilder::new(self.config.ignore_case);
        self.report = None;
        self.frozen = false;
        debug!("engine reset");
    }
}
