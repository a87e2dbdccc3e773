//! Canonical comparison scenarios shared by tests across the workspace.
//!
//! Each [`Scenario`] is a complete declaration script for both graphs plus
//! the outcome a correct engine must report for it.

use crate::GraphIndex;

/// A device template declaration.
#[derive(Debug, Clone, Copy)]
pub struct TemplateDef {
    pub name: &'static str,
    pub pins: &'static [&'static str],
}

/// A device instance declaration.
#[derive(Debug, Clone, Copy)]
pub struct InstanceDef {
    pub graph: GraphIndex,
    pub template: &'static str,
    pub name: &'static str,
    pub nets: &'static [&'static str],
}

/// A net alias declaration.
#[derive(Debug, Clone, Copy)]
pub struct AliasDef {
    pub graph: GraphIndex,
    pub primary: &'static str,
    pub aliases: &'static [&'static str],
}

/// The outcome a scenario must produce at the default depth.
#[derive(Debug, Clone, Copy)]
pub struct Expectation {
    /// Whether every device is covered by a match.
    pub passed: bool,
    /// Matched instance pairs, graph 0 name first, sorted.
    pub matched: &'static [(&'static str, &'static str)],
    /// Vertices reported as having no counterpart, sorted.
    pub mismatch_other: &'static [(GraphIndex, &'static str)],
    /// Number of unresolved symmetric classes.
    pub symmetry_classes: usize,
    /// Number of bad equate findings.
    pub bad: usize,
}

/// A complete declaration script and its expected outcome.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    /// The name of the scenario.
    pub name: &'static str,
    pub templates: &'static [TemplateDef],
    pub instances: &'static [InstanceDef],
    pub aliases: &'static [AliasDef],
    /// Equate hints, graph 0 instance first.
    pub equates: &'static [(&'static str, &'static str)],
    pub expected: Expectation,
}

impl Scenario {
    /// Instances declared for `graph`, in declaration order.
    pub fn instances_of(&self, graph: GraphIndex) -> impl Iterator<Item = &InstanceDef> {
        self.instances.iter().filter(move |i| i.graph == graph)
    }

    /// Total number of devices in `graph`.
    #[must_use]
    pub fn device_count(&self, graph: GraphIndex) -> usize {
        self.instances_of(graph).count()
    }
}

use crate::GraphIndex::{First as G0, Second as G1};

// #####################
// TEMPLATES
// #####################
const M1: TemplateDef = TemplateDef {
    name: "M1",
    pins: &["a", "b", "c"],
};

const RES: TemplateDef = TemplateDef {
    name: "res",
    pins: &["a", "b"],
};

const INV: TemplateDef = TemplateDef {
    name: "inv",
    pins: &["in", "out", "vdd", "gnd"],
};

const BUF: TemplateDef = TemplateDef {
    name: "buf",
    pins: &["in", "out", "vdd", "gnd"],
};

// Source and drain are interchangeable.
const NFET: TemplateDef = TemplateDef {
    name: "nfet",
    pins: &["sd", "g", "sd"],
};

// #####################
// SCENARIOS
// #####################

/// Two devices on a shared template where `I2` is wired differently.
pub const M1_SCENARIO: Scenario = Scenario {
    name: "m1_pin_mismatch",
    templates: &[M1],
    instances: &[
        InstanceDef { graph: G0, template: "M1", name: "I1", nets: &["x", "y", "nc"] },
        InstanceDef { graph: G0, template: "M1", name: "I2", nets: &["x", "x", "y"] },
        InstanceDef { graph: G1, template: "M1", name: "I1", nets: &["x", "y", "nc"] },
        InstanceDef { graph: G1, template: "M1", name: "I2", nets: &["x", "y", "y"] },
    ],
    aliases: &[],
    equates: &[],
    expected: Expectation {
        passed: false,
        matched: &[("I1", "I1")],
        mismatch_other: &[(G0, "I2"), (G1, "I2")],
        symmetry_classes: 0,
        bad: 0,
    },
};

/// The M1 scenario with a contradictory hint and a hint naming an unknown instance.
pub const M1_BAD_EQUATES: Scenario = Scenario {
    name: "m1_bad_equates",
    equates: &[("I2", "I2"), ("I9", "I1")],
    expected: Expectation {
        bad: 2,
        ..M1_SCENARIO.expected
    },
    ..M1_SCENARIO
};

const PARALLEL_RESISTOR_INSTANCES: &[InstanceDef] = &[
    InstanceDef { graph: G0, template: "res", name: "R1", nets: &["n1", "n2"] },
    InstanceDef { graph: G0, template: "res", name: "R2", nets: &["n1", "n2"] },
    InstanceDef { graph: G1, template: "res", name: "Ra", nets: &["p", "q"] },
    InstanceDef { graph: G1, template: "res", name: "Rb", nets: &["p", "q"] },
];

/// Two identical resistors in parallel, no hints.
pub const PARALLEL_RESISTORS: Scenario = Scenario {
    name: "parallel_resistors",
    templates: &[RES],
    instances: PARALLEL_RESISTOR_INSTANCES,
    aliases: &[],
    equates: &[],
    expected: Expectation {
        passed: false,
        matched: &[],
        mismatch_other: &[],
        symmetry_classes: 1,
        bad: 0,
    },
};

/// Two identical resistors in parallel, one pair equated.
pub const PARALLEL_RESISTORS_EQUATED: Scenario = Scenario {
    name: "parallel_resistors_equated",
    equates: &[("R1", "Ra")],
    expected: Expectation {
        passed: true,
        matched: &[("R1", "Ra"), ("R2", "Rb")],
        mismatch_other: &[],
        symmetry_classes: 0,
        bad: 0,
    },
    ..PARALLEL_RESISTORS
};

/// Three inverters in a chain. Graph 1 is declared out of order and reaches
/// its supply through an alias.
pub const INVERTER_CHAIN: Scenario = Scenario {
    name: "inverter_chain",
    templates: &[INV],
    instances: &[
        InstanceDef { graph: G0, template: "inv", name: "U1", nets: &["a", "b", "vdd", "gnd"] },
        InstanceDef { graph: G0, template: "inv", name: "U2", nets: &["b", "c", "vdd", "gnd"] },
        InstanceDef { graph: G0, template: "inv", name: "U3", nets: &["c", "d", "vdd", "gnd"] },
        InstanceDef { graph: G1, template: "inv", name: "X3", nets: &["n3", "out", "vdd", "vss"] },
        InstanceDef { graph: G1, template: "inv", name: "X1", nets: &["in", "n2", "vcc", "vss"] },
        InstanceDef { graph: G1, template: "inv", name: "X2", nets: &["n2", "n3", "vdd", "vss"] },
    ],
    aliases: &[AliasDef { graph: G1, primary: "vdd", aliases: &["vcc"] }],
    equates: &[],
    expected: Expectation {
        passed: true,
        matched: &[("U1", "X1"), ("U2", "X2"), ("U3", "X3")],
        mismatch_other: &[],
        symmetry_classes: 0,
        bad: 0,
    },
};

/// The inverter chain with the last inverter of graph 1 fed from the wrong net.
pub const INVERTER_CHAIN_REWIRED: Scenario = Scenario {
    name: "inverter_chain_rewired",
    templates: &[INV],
    instances: &[
        InstanceDef { graph: G0, template: "inv", name: "U1", nets: &["a", "b", "vdd", "gnd"] },
        InstanceDef { graph: G0, template: "inv", name: "U2", nets: &["b", "c", "vdd", "gnd"] },
        InstanceDef { graph: G0, template: "inv", name: "U3", nets: &["c", "d", "vdd", "gnd"] },
        InstanceDef { graph: G1, template: "inv", name: "X1", nets: &["in", "n2", "vdd", "vss"] },
        InstanceDef { graph: G1, template: "inv", name: "X2", nets: &["n2", "n3", "vdd", "vss"] },
        InstanceDef { graph: G1, template: "inv", name: "X3", nets: &["n2", "out", "vdd", "vss"] },
    ],
    aliases: &[],
    equates: &[],
    expected: Expectation {
        passed: false,
        matched: &[],
        mismatch_other: &[
            (G0, "U1"),
            (G0, "U2"),
            (G0, "U3"),
            (G1, "X1"),
            (G1, "X2"),
            (G1, "X3"),
        ],
        symmetry_classes: 0,
        bad: 0,
    },
};

/// An inverter driving a buffer in graph 0. In graph 1 the buffer sits on
/// its own nets. Each device is unique by type, so only its neighbours tell
/// the graphs apart.
pub const INVERTER_BUFFER_DISJOINT: Scenario = Scenario {
    name: "inverter_buffer_disjoint",
    templates: &[INV, BUF],
    instances: &[
        InstanceDef { graph: G0, template: "inv", name: "U1", nets: &["a", "b", "vdd", "gnd"] },
        InstanceDef { graph: G0, template: "buf", name: "U2", nets: &["b", "c", "vdd", "gnd"] },
        InstanceDef { graph: G1, template: "inv", name: "U1", nets: &["a", "b", "vdd", "gnd"] },
        InstanceDef { graph: G1, template: "buf", name: "U2", nets: &["c", "d", "vdd", "gnd"] },
    ],
    aliases: &[],
    equates: &[],
    expected: Expectation {
        passed: false,
        matched: &[],
        mismatch_other: &[(G0, "U1"), (G0, "U2"), (G1, "U1"), (G1, "U2")],
        symmetry_classes: 0,
        bad: 0,
    },
};

/// Two chained inverters with a hint that pairs the first stage of graph 0
/// with the second stage of graph 1.
pub const CHAIN_CROSSED_EQUATE: Scenario = Scenario {
    name: "chain_crossed_equate",
    templates: &[INV],
    instances: &[
        InstanceDef { graph: G0, template: "inv", name: "U1", nets: &["a", "b", "vdd", "gnd"] },
        InstanceDef { graph: G0, template: "inv", name: "U2", nets: &["b", "c", "vdd", "gnd"] },
        InstanceDef { graph: G1, template: "inv", name: "U1", nets: &["a", "b", "vdd", "gnd"] },
        InstanceDef { graph: G1, template: "inv", name: "U2", nets: &["b", "c", "vdd", "gnd"] },
    ],
    aliases: &[],
    equates: &[("U1", "U2")],
    expected: Expectation {
        passed: true,
        matched: &[("U1", "U1"), ("U2", "U2")],
        mismatch_other: &[],
        symmetry_classes: 0,
        bad: 1,
    },
};

const SRAM_INSTANCES: &[InstanceDef] = &[
    InstanceDef { graph: G0, template: "nfet", name: "T00", nets: &["bl0", "wl0", "c00"] },
    InstanceDef { graph: G0, template: "nfet", name: "T01", nets: &["bl1", "wl0", "c01"] },
    InstanceDef { graph: G0, template: "nfet", name: "T10", nets: &["bl0", "wl1", "c10"] },
    InstanceDef { graph: G0, template: "nfet", name: "T11", nets: &["bl1", "wl1", "c11"] },
    InstanceDef { graph: G1, template: "nfet", name: "S11", nets: &["c11", "w1", "b1"] },
    InstanceDef { graph: G1, template: "nfet", name: "S10", nets: &["c10", "w1", "b0"] },
    InstanceDef { graph: G1, template: "nfet", name: "S01", nets: &["b1", "w0", "c01"] },
    InstanceDef { graph: G1, template: "nfet", name: "S00", nets: &["b0", "w0", "c00"] },
];

/// A 2x2 array of access transistors. Rows and columns are interchangeable,
/// so structure alone cannot pair the cells.
pub const SRAM_ARRAY: Scenario = Scenario {
    name: "sram_array",
    templates: &[NFET],
    instances: SRAM_INSTANCES,
    aliases: &[],
    equates: &[],
    expected: Expectation {
        passed: false,
        matched: &[],
        mismatch_other: &[],
        symmetry_classes: 1,
        bad: 0,
    },
};

/// The access transistor array with one corner cell equated.
pub const SRAM_ARRAY_EQUATED: Scenario = Scenario {
    name: "sram_array_equated",
    equates: &[("T00", "S00")],
    expected: Expectation {
        passed: true,
        matched: &[("T00", "S00"), ("T01", "S01"), ("T10", "S10"), ("T11", "S11")],
        mismatch_other: &[],
        symmetry_classes: 0,
        bad: 0,
    },
    ..SRAM_ARRAY
};

/// Every scenario, in a stable order.
pub const ALL_SCENARIOS: &[Scenario] = &[
    M1_SCENARIO,
    M1_BAD_EQUATES,
    PARALLEL_RESISTORS,
    PARALLEL_RESISTORS_EQUATED,
    INVERTER_CHAIN,
    INVERTER_CHAIN_REWIRED,
    INVERTER_BUFFER_DISJOINT,
    CHAIN_CROSSED_EQUATE,
    SRAM_ARRAY,
    SRAM_ARRAY_EQUATED,
];

/// Looks up a scenario by name.
#[must_use]
pub fn scenario(name: &str) -> Option<&'static Scenario> {
    ALL_SCENARIOS.iter().find(|s| s.name == name)
}
