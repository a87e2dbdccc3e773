#![allow(missing_docs)]

use netcmp_common::{Config, FindingKind, GraphIndex, VertexKind};
use netcmp_engine::test_harness::{mismatched, setup_test_logging};
use netcmp_engine::{Compare, Report};
use quickcheck::{Arbitrary, Gen, quickcheck};

const TEMPLATES: &[(&str, &[&str])] = &[
    ("res", &["a", "b"]),
    ("nfet", &["sd", "g", "sd"]),
    ("inv", &["in", "out", "vdd", "gnd"]),
];

/// A random circuit over the fixed template set: one entry per device,
/// holding its template index and the net index of each pin.
#[derive(Clone, Debug)]
struct Circuit {
    devices: Vec<(usize, Vec<usize>)>,
}

impl Arbitrary for Circuit {
    fn arbitrary(g: &mut Gen) -> Self {
        let nets = 1 + usize::arbitrary(g) % 6;
        let count = 1 + usize::arbitrary(g) % 8;
        let mut devices = Vec::with_capacity(count);
        for _ in 0..count {
            let template = usize::arbitrary(g) % TEMPLATES.len();
            let mut pins = Vec::new();
            for _ in 0..TEMPLATES[template].1.len() {
                pins.push(usize::arbitrary(g) % nets);
            }
            devices.push((template, pins));
        }
        Self { devices }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let devices = self.devices.clone();
        let len = devices.len();
        Box::new((0..len).filter(move |_| len > 1).map(move |skip| Self {
            devices: devices
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, d)| d.clone())
                .collect(),
        }))
    }
}

fn declare_templates(cmp: &mut Compare, reversed: bool) {
    let mut order: Vec<usize> = (0..TEMPLATES.len()).collect();
    if reversed {
        order.reverse();
    }
    for i in order {
        let (name, pins) = TEMPLATES[i];
        cmp.define_device_template(name, pins).unwrap();
    }
}

fn declare_graph(
    cmp: &mut Compare,
    graph: usize,
    circuit: &Circuit,
    order: impl IntoIterator<Item = usize>,
    instance: &str,
    net_name: impl Fn(usize, usize) -> String,
) {
    for i in order {
        let (template, pins) = &circuit.devices[i];
        let nets: Vec<String> = pins.iter().map(|&p| net_name(i, p)).collect();
        cmp.define_instance(graph, TEMPLATES[*template].0, &format!("{instance}{i}"), &nets)
            .unwrap();
    }
}

fn plain(_: usize, net: usize) -> String {
    format!("n{net}")
}

fn natural(c: &Circuit) -> std::ops::Range<usize> {
    0..c.devices.len()
}

fn run(config: Config, declare: impl FnOnce(&mut Compare)) -> Report {
    setup_test_logging();
    let mut cmp = Compare::with_config(config);
    declare_templates(&mut cmp, false);
    declare(&mut cmp);
    cmp.execute().unwrap().clone()
}

fn run_pair(config: Config, a: &Circuit, b: &Circuit) -> Report {
    run(config, |cmp| {
        declare_graph(cmp, 0, a, natural(a), "D", plain);
        declare_graph(cmp, 1, b, natural(b), "D", plain);
    })
}

quickcheck! {
    fn prop_renamed_copy_never_mismatches(c: Circuit) -> bool {
        let report = run(Config::default(), |cmp| {
            declare_graph(cmp, 0, &c, natural(&c), "D", plain);
            declare_graph(cmp, 1, &c, natural(&c).rev(), "X", |_, p| format!("m{p}"));
        });
        let balanced = report.of_kind(FindingKind::MismatchSymmetry).all(|f| {
            let first = f.vertices.iter().filter(|v| v.graph == GraphIndex::First).count();
            2 * first == f.vertices.len()
        });
        report.count(FindingKind::MismatchOther) == 0
            && report.count(FindingKind::Bad) == 0
            && balanced
    }

    fn prop_alias_is_transparent(c: Circuit, k: usize) -> bool {
        let k = k % 6;
        let baseline = run_pair(Config::default(), &c, &c);
        let aliased = run(Config::default(), |cmp| {
            declare_graph(cmp, 0, &c, natural(&c), "D", plain);
            declare_graph(cmp, 1, &c, natural(&c), "D", |i, p| {
                if p == k && i % 2 == 1 {
                    format!("alias{k}")
                } else {
                    plain(i, p)
                }
            });
            cmp.define_net_alias(1, &format!("n{k}"), &[format!("alias{k}")]).unwrap();
        });
        baseline.findings == aliased.findings
            && baseline.class_assignment == aliased.class_assignment
    }

    fn prop_depth_is_monotonic(a: Circuit, b: Circuit, depth: u8, extra: u8) -> bool {
        let low = usize::from(depth % 4);
        let high = low + 1 + usize::from(extra % 4);
        let shallow = run_pair(Config::builder().max_refinement_depth(low).build(), &a, &b);
        let deep = run_pair(Config::builder().max_refinement_depth(high).build(), &a, &b);

        // A pass proves the circuits equal, which no depth can contradict.
        (!shallow.passed() || deep.passed())
            && (!deep.passed() || mismatched(&shallow).is_empty())
    }

    fn prop_declaration_order_is_irrelevant(a: Circuit, b: Circuit, rotation: usize) -> bool {
        let forward = run_pair(Config::default(), &a, &b);

        let mut cmp = Compare::new();
        declare_templates(&mut cmp, true);
        let n = b.devices.len();
        let rotated = (0..n).map(|i| (i + rotation % n) % n);
        declare_graph(&mut cmp, 1, &b, rotated, "D", plain);
        declare_graph(&mut cmp, 0, &a, natural(&a).rev(), "D", plain);
        let shuffled = cmp.execute().unwrap();

        forward.findings == shuffled.findings
            && forward.class_assignment == shuffled.class_assignment
    }

    fn prop_reset_isolates_runs(noise: Circuit, a: Circuit, b: Circuit) -> bool {
        let fresh = run_pair(Config::default(), &a, &b);

        let mut cmp = Compare::new();
        declare_templates(&mut cmp, false);
        declare_graph(&mut cmp, 0, &noise, natural(&noise), "D", plain);
        declare_graph(&mut cmp, 1, &noise, natural(&noise).rev(), "D", |_, p| format!("q{p}"));
        cmp.define_equate("D0", "D0").unwrap();
        cmp.execute().unwrap();

        cmp.reset();
        declare_templates(&mut cmp, false);
        declare_graph(&mut cmp, 0, &a, natural(&a), "D", plain);
        declare_graph(&mut cmp, 1, &b, natural(&b), "D", plain);
        *cmp.execute().unwrap() == fresh
    }

    fn prop_every_device_reported_once(a: Circuit, b: Circuit) -> bool {
        let report = run_pair(Config::default(), &a, &b);
        GraphIndex::BOTH.iter().all(|&graph| {
            let mut names: Vec<&str> = report
                .findings
                .iter()
                .filter(|f| f.vertex_kind == VertexKind::Device)
                .flat_map(|f| f.vertices.iter())
                .filter(|v| v.graph == graph)
                .map(|v| v.name.as_str())
                .collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            total == names.len() && total == report.device_counts[graph.as_usize()]
        })
    }

    fn prop_rewired_pin_never_passes(c: Circuit, device: usize, pin: usize) -> bool {
        let mut fanout = std::collections::HashMap::new();
        for (_, pins) in &c.devices {
            for &net in pins {
                *fanout.entry(net).or_insert(0) += 1;
            }
        }
        let n = c.devices.len();
        let pins_of = |i: usize| c.devices[i].1.len();
        let Some((device, pin)) = (0..n)
            .map(|k| (device + k) % n)
            .flat_map(|i| (0..pins_of(i)).map(move |k| (i, (pin + k) % pins_of(i))))
            .find(|&(i, k)| fanout[&c.devices[i].1[k]] > 1)
        else {
            return true;
        };

        let report = run(Config::default(), |cmp| {
            declare_graph(cmp, 0, &c, natural(&c), "D", plain);
            for i in natural(&c) {
                let (template, pins) = &c.devices[i];
                let nets: Vec<String> = pins
                    .iter()
                    .enumerate()
                    .map(|(k, &p)| {
                        if (i, k) == (device, pin) {
                            "fresh".to_string()
                        } else {
                            plain(i, p)
                        }
                    })
                    .collect();
                cmp.define_instance(1, TEMPLATES[*template].0, &format!("D{i}"), &nets)
                    .unwrap();
            }
        });
        !report.passed()
    }

    fn prop_parallel_matches_sequential(a: Circuit, b: Circuit) -> bool {
        let parallel = run_pair(Config::default(), &a, &b);
        let sequential = run_pair(Config::builder().parallel(false).build(), &a, &b);
        parallel == sequential
    }
}
