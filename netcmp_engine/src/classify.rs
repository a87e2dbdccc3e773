//! Radius-0 classification.
//!
//! A device's local signature is its template plus, for each distinct net it
//! touches, the sorted list of pin classes landing there. Net names play no
//! part, so the signature is comparable across graphs.

use std::collections::BTreeMap;

use netcmp_common::GraphIndex;

use crate::Timer;
use crate::builder::PinClass;
use crate::index::{Device, FrozenGraph};
use crate::refine::{Label, Partition};

type LocalSignature<'a> = (&'a str, Vec<Vec<PinClass>>);

fn local_signature(device: &Device) -> LocalSignature<'_> {
    let mut by_net: BTreeMap<usize, Vec<PinClass>> = BTreeMap::new();
    for &(net, class) in &device.pins {
        by_net.entry(net).or_default().push(class);
    }
    let mut groups: Vec<Vec<PinClass>> = by_net
        .into_values()
        .map(|mut classes| {
            classes.sort_unstable();
            classes
        })
        .collect();
    groups.sort_unstable();
    (device.template.as_str(), groups)
}

/// Seeds the partition: one pending class per distinct local signature,
/// numbered in signature order across both graphs.
pub fn classify(graphs: &[FrozenGraph; 2]) -> Partition {
    let _t = Timer::new("classify::classify");

    let signatures: [Vec<LocalSignature<'_>>; 2] = graphs
        .each_ref()
        .map(|g| g.devices.iter().map(local_signature).collect());

    let mut classes: BTreeMap<&LocalSignature<'_>, u32> = BTreeMap::new();
    for signature in signatures.iter().flatten() {
        classes.insert(signature, 0);
    }
    for (id, class) in classes.values_mut().enumerate() {
        *class = id as u32;
    }

    let labels = GraphIndex::BOTH.map(|g| {
        signatures[g.as_usize()]
            .iter()
            .map(|s| Label::Class(classes.get(s).copied().unwrap_or_default()))
            .collect()
    });
    Partition::new(labels)
}
