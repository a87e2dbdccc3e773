//! Configuration for a comparison run.
//!
//! Quick example:
//! ```ignore
//! use netcmp_common::Config;
//! let cfg = Config::builder().max_refinement_depth(8).trace(true).build();
//! ```

use serde::{Deserialize, Serialize};

use crate::GraphIndex;

/// Default number of refinement rounds.
pub const DEFAULT_MAX_REFINEMENT_DEPTH: usize = 31;

/// Comparison settings.
///
/// - max_refinement_depth: upper bound on refinement rounds. Highly regular
///   circuits never fully separate their symmetric devices, so refinement
///   stops here even without a fixpoint.
/// - trace: emit `General` findings (phase markers, net summaries).
/// - ignore_case: compare template, instance, pin and net names without
///   regard to ASCII case. Fixed for the lifetime of an engine.
/// - parallel: compute round signatures on the rayon pool when the `rayon`
///   feature is enabled. Has no effect on results.
/// - graph_names: cosmetic labels for the two graphs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on refinement rounds.
    pub max_refinement_depth: usize,
    /// Whether informational findings are emitted.
    pub trace: bool,
    /// Whether names are compared case-insensitively.
    pub ignore_case: bool,
    /// Whether round signatures are computed in parallel.
    pub parallel: bool,
    /// Display labels for graph 0 and graph 1.
    pub graph_names: [String; 2],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_refinement_depth: DEFAULT_MAX_REFINEMENT_DEPTH,
            trace: false,
            ignore_case: false,
            parallel: true,
            graph_names: ["graph0".to_string(), "graph1".to_string()],
        }
    }
}

impl Config {
    /// Start building a configuration from the defaults.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Display label of `graph`.
    #[must_use]
    pub fn graph_name(&self, graph: GraphIndex) -> &str {
        &self.graph_names[graph.as_usize()]
    }

    /// Normalize a name for lookups according to `ignore_case`.
    #[must_use]
    pub fn name_key(&self, name: &str) -> String {
        if self.ignore_case {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }
}

/// Chained builder for [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the refinement depth ceiling.
    #[must_use]
    pub const fn max_refinement_depth(mut self, depth: usize) -> Self {
        self.config.max_refinement_depth = depth;
        self
    }

    /// Enable or disable informational findings.
    #[must_use]
    pub const fn trace(mut self, trace: bool) -> Self {
        self.config.trace = trace;
        self
    }

    /// Enable or disable case-insensitive names.
    #[must_use]
    pub const fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.config.ignore_case = ignore_case;
        self
    }

    /// Enable or disable parallel signature computation.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set the display label of one graph.
    #[must_use]
    pub fn graph_name(mut self, graph: GraphIndex, name: impl Into<String>) -> Self {
        self.config.graph_names[graph.as_usize()] = name.into();
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.max_refinement_depth, 31);
        assert!(!cfg.trace);
        assert!(!cfg.ignore_case);
        assert!(cfg.parallel);
        assert_eq!(cfg.graph_name(GraphIndex::Second), "graph1");
    }

    #[test]
    fn test_builder_chain() {
        let cfg = Config::builder()
            .max_refinement_depth(4)
            .trace(true)
            .ignore_case(true)
            .graph_name(GraphIndex::First, "schematic")
            .build();
        assert_eq!(cfg.max_refinement_depth, 4);
        assert!(cfg.trace);
        assert_eq!(cfg.graph_name(GraphIndex::First), "schematic");
        assert_eq!(cfg.name_key("VDD"), "vdd");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "trace": true }"#).unwrap();
        assert!(cfg.trace);
        assert_eq!(cfg.max_refinement_depth, DEFAULT_MAX_REFINEMENT_DEPTH);
    }

    #[rstest]
    #[case::exact(false, "VDD", "VDD")]
    #[case::folded(true, "VDD", "vdd")]
    #[case::mixed(true, "Net_A1", "net_a1")]
    fn test_name_key(#[case] ignore_case: bool, #[case] name: &str, #[case] key: &str) {
        let cfg = Config::builder().ignore_case(ignore_case).build();
        assert_eq!(cfg.name_key(name), key);
    }

    quickcheck! {
        fn prop_folded_keys_ignore_case(name: String) -> bool {
            let cfg = Config::builder().ignore_case(true).build();
            cfg.name_key(&name.to_ascii_uppercase()) == cfg.name_key(&name.to_ascii_lowercase())
        }
    }
}
