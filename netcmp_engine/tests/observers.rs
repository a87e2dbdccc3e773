#![allow(missing_docs)]

use std::sync::{Arc, Mutex};

use netcmp_common::{M1_SCENARIO, PARALLEL_RESISTORS_EQUATED};
use netcmp_engine::test_harness::{declare_scenario, load_scenario, setup_test_logging};
use netcmp_engine::{
    Channel, Compare, CompareError, CompareListener, Config, Finding, FindingKind, FnListener,
    Payload, VertexKind,
};

type Log = Arc<Mutex<Vec<(Channel, Finding)>>>;

fn recorder(cmp: &mut Compare) -> (Log, netcmp_engine::ListenerId) {
    let log: Log = Arc::default();
    let sink = log.clone();
    let id = cmp.add_listener(FnListener(move |channel: Channel, finding: &Finding| {
        sink.lock().unwrap().push((channel, finding.clone()));
    }));
    (log, id)
}

#[test]
fn test_listeners_see_findings_in_report_order() {
    setup_test_logging();
    let cfg = Config::builder().trace(true).build();
    let mut cmp = load_scenario(&M1_SCENARIO, cfg).unwrap();
    let (log, _) = recorder(&mut cmp);

    let report = cmp.execute().unwrap().clone();
    let seen = log.lock().unwrap();
    let delivered: Vec<&Finding> = seen.iter().map(|(_, f)| f).collect();
    let reported: Vec<&Finding> = report.findings.iter().collect();
    assert_eq!(delivered, reported);
    for (channel, finding) in seen.iter() {
        assert_eq!(*channel, finding.channel());
    }
}

#[test]
fn test_trace_controls_general_findings() {
    let mut quiet = load_scenario(&M1_SCENARIO, Config::default()).unwrap();
    assert_eq!(quiet.execute().unwrap().count(FindingKind::General), 0);

    let mut cmp = load_scenario(&M1_SCENARIO, Config::default()).unwrap();
    cmp.set_trace(true);
    cmp.define_net_alias(0, "spare", &["spare_b"]).unwrap();
    let report = cmp.execute().unwrap();
    let messages: Vec<&str> = report
        .of_kind(FindingKind::General)
        .map(|f| f.message.as_str())
        .collect();

    assert_eq!(messages[0], "graph0: 2 devices, 3 nets");
    assert!(messages.contains(&"graph0: ignoring net spare -- no connection"));
    assert!(messages.contains(&"graph0: 1 of 3 nets matched"));
    assert_eq!(messages.last(), Some(&"the circuits are different"));
}

#[test]
fn test_passing_run_announces_success() {
    let cfg = Config::builder().trace(true).build();
    let mut cmp = load_scenario(&PARALLEL_RESISTORS_EQUATED, cfg).unwrap();
    let report = cmp.execute().unwrap();
    assert!(report.passed());
    let last = report.findings.last().unwrap();
    assert_eq!(last.kind, FindingKind::General);
    assert_eq!(last.message, "all devices were matched in 1 passes");
}

#[test]
fn test_net_findings_arrive_on_status_channel() {
    let mut cmp = load_scenario(&M1_SCENARIO, Config::default()).unwrap();
    let (log, _) = recorder(&mut cmp);
    cmp.execute().unwrap();

    let seen = log.lock().unwrap();
    let nets: Vec<&(Channel, Finding)> = seen
        .iter()
        .filter(|(_, f)| f.vertex_kind == VertexKind::Net)
        .collect();
    assert_eq!(nets.len(), 5);
    assert!(nets.iter().all(|(channel, _)| *channel == Channel::Status));
    assert!(nets.iter().all(|(_, f)| f.vertices.iter().all(|v| v.payload.is_none())));
}

#[test]
fn test_payload_is_echoed() {
    let mut cmp = Compare::new();
    cmp.define_device_template("res", &["a", "b"]).unwrap();
    cmp.define_instance_with_payload(0, "res", "R1", &["p", "q"], Payload(7))
        .unwrap();
    cmp.define_instance(1, "res", "Ra", &["p", "r"]).unwrap();
    cmp.define_instance(1, "res", "Rb", &["r", "q"]).unwrap();

    let report = cmp.execute().unwrap();
    let r1 = report
        .findings
        .iter()
        .flat_map(|f| f.vertices.iter())
        .find(|v| v.name == "R1")
        .unwrap();
    assert_eq!(r1.payload, Some(Payload(7)));
}

#[test]
fn test_listeners_survive_reset_until_removed() {
    let mut cmp = Compare::new();
    let (log, id) = recorder(&mut cmp);
    declare_scenario(&mut cmp, &M1_SCENARIO).unwrap();
    let reported = cmp.execute().unwrap().findings.len();
    let first_run = log.lock().unwrap().len();
    assert_eq!(first_run, reported);

    cmp.reset();
    declare_scenario(&mut cmp, &M1_SCENARIO).unwrap();
    cmp.execute().unwrap();
    assert_eq!(log.lock().unwrap().len(), 2 * first_run);

    assert!(cmp.remove_listener(id));
    cmp.reset();
    declare_scenario(&mut cmp, &M1_SCENARIO).unwrap();
    cmp.execute().unwrap();
    assert_eq!(log.lock().unwrap().len(), 2 * first_run);
}

#[derive(Default)]
struct WarningCounter(Arc<Mutex<usize>>);

impl CompareListener for WarningCounter {
    fn warning(&mut self, _finding: &Finding) {
        *self.0.lock().unwrap() += 1;
    }
}

#[test]
fn test_bad_equates_go_to_warning_channel() {
    let mut cmp = load_scenario(&M1_SCENARIO, Config::default()).unwrap();
    let warnings = Arc::new(Mutex::new(0));
    cmp.add_listener(WarningCounter(warnings.clone()));
    cmp.define_equate("I2", "I2").unwrap();
    cmp.define_equate("I7", "I1").unwrap();
    cmp.execute().unwrap();
    assert_eq!(*warnings.lock().unwrap(), 2);
}

#[test]
fn test_failed_declarations_leave_state_intact() {
    let mut clean = load_scenario(&M1_SCENARIO, Config::default()).unwrap();
    let expected = clean.execute().unwrap().clone();

    let mut cmp = load_scenario(&M1_SCENARIO, Config::default()).unwrap();
    assert!(matches!(
        cmp.define_instance(0, "M1", "I3", &["x", "y"]),
        Err(CompareError::ArityMismatch { .. })
    ));
    assert!(matches!(
        cmp.define_instance(1, "M1", "I1", &["p", "q", "r"]),
        Err(CompareError::DuplicateInstance { .. })
    ));
    assert!(matches!(
        cmp.define_instance(0, "M2", "I4", &["p"]),
        Err(CompareError::UnknownTemplate { .. })
    ));
    assert!(matches!(
        cmp.define_device_template("M1", &["a"]),
        Err(CompareError::DuplicateTemplate { .. })
    ));
    cmp.define_net_alias(0, "x", &["x_alt"]).unwrap();
    cmp.define_net_alias(0, "y", &["y_alt"]).unwrap();
    assert!(matches!(
        cmp.define_net_alias(0, "x_alt", &["y_alt"]),
        Err(CompareError::ConflictingAlias { .. })
    ));

    assert_eq!(*cmp.execute().unwrap(), expected);
}

#[test]
fn test_ignore_case_names() {
    let cfg = Config::builder().ignore_case(true).build();
    let mut cmp = Compare::with_config(cfg);
    cmp.define_device_template("NMOS", &["D", "G", "S"]).unwrap();
    cmp.define_instance(0, "nmos", "M1", &["out", "in", "GND"]).unwrap();
    cmp.define_instance(0, "nmos", "M2", &["VDD", "in", "out"]).unwrap();
    cmp.define_instance(1, "Nmos", "m1", &["OUT", "IN", "gnd"]).unwrap();
    cmp.define_instance(1, "Nmos", "m2", &["vdd", "In", "Out"]).unwrap();
    cmp.define_equate("M1", "M1").unwrap();

    let report = cmp.execute().unwrap();
    assert!(report.passed());
    assert_eq!(report.count(FindingKind::Bad), 0);
    assert_eq!(report.partner("M1"), Some("m1"));
}
