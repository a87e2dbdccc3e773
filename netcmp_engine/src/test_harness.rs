#![allow(dead_code)]

use std::sync::Once;

use netcmp_common::{
    CompareError, Config, ConfigBuilder, FindingKind, GraphIndex, Scenario, VertexKind,
};

use crate::{Compare, Report};

static INIT: Once = Once::new();

/// Configures logging for the test runner.
pub fn setup_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Declares every template, instance, alias and equate of a scenario on a
/// fresh engine.
pub fn load_scenario(scenario: &Scenario, config: Config) -> Result<Compare, CompareError> {
    let mut cmp = Compare::with_config(config);
    declare_scenario(&mut cmp, scenario)?;
    Ok(cmp)
}

/// Declares a scenario on an existing engine.
pub fn declare_scenario(cmp: &mut Compare, scenario: &Scenario) -> Result<(), CompareError> {
    for t in scenario.templates {
        cmp.define_device_template(t.name, t.pins)?;
    }
    for inst in scenario.instances {
        cmp.define_instance(inst.graph.as_usize(), inst.template, inst.name, inst.nets)?;
    }
    for alias in scenario.aliases {
        cmp.define_net_alias(alias.graph.as_usize(), alias.primary, alias.aliases)?;
    }
    for (first, second) in scenario.equates {
        cmp.define_equate(first, second)?;
    }
    Ok(())
}

/// Devices of all `MismatchOther` findings, sorted.
pub fn mismatched(report: &Report) -> Vec<(GraphIndex, String)> {
    let mut out: Vec<(GraphIndex, String)> = report
        .of_kind(FindingKind::MismatchOther)
        .filter(|f| f.vertex_kind == VertexKind::Device)
        .flat_map(|f| f.vertices.iter().map(|v| (v.graph, v.name.clone())))
        .collect();
    out.sort();
    out
}

/// Runs a scenario and checks its report against the scenario's expectation.
#[track_caller]
pub fn run_scenario(
    scenario: &Scenario,
    config_fn: Option<fn(ConfigBuilder) -> ConfigBuilder>,
) -> Result<Report, Box<dyn std::error::Error>> {
    setup_test_logging();

    let mut builder = Config::builder();
    if let Some(f) = config_fn {
        builder = f(builder);
    }
    let mut cmp = load_scenario(scenario, builder.build())?;
    let report = cmp.execute()?.clone();
    let expected = &scenario.expected;

    let matched: Vec<(&str, &str)> = report
        .matches
        .iter()
        .map(|(a, b)| (a.as_str(), b.as_str()))
        .collect();
    let mismatch_other: Vec<(GraphIndex, String)> = expected
        .mismatch_other
        .iter()
        .map(|&(g, n)| (g, n.to_string()))
        .collect();

    let checks = [
        ("passed", report.passed() == expected.passed),
        ("matched", matched == expected.matched),
        ("mismatch_other", mismatched(&report) == mismatch_other),
        (
            "symmetry_classes",
            report.count(FindingKind::MismatchSymmetry) == expected.symmetry_classes,
        ),
        ("bad", report.count(FindingKind::Bad) == expected.bad),
    ];
    for (what, ok) in checks {
        if !ok {
            tracing::error!(
                "scenario {} failed on {}: findings {:#?}",
                scenario.name,
                what,
                report.findings
            );
            return Err(format!("scenario '{}' failed on {}", scenario.name, what).into());
        }
    }
    Ok(report)
}

/// Defines a test running one named scenario.
#[macro_export]
macro_rules! scenario_test {
    (name: $test_name:ident, scenario: $scenario:expr) => {
        #[test]
        fn $test_name() -> Result<(), Box<dyn std::error::Error>> {
            $crate::test_harness::run_scenario(&$scenario, None).map(|_| ())
        }
    };

    (name: $test_name:ident, scenario: $scenario:expr, config: $cfg:expr) => {
        #[test]
        fn $test_name() -> Result<(), Box<dyn std::error::Error>> {
            $crate::test_harness::run_scenario(&$scenario, Some($cfg)).map(|_| ())
        }
    };
}
