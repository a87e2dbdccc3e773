//! Observer registration for the finding stream.
//!
//! Findings are delivered synchronously, in discovery order, to every
//! registered listener in registration order.

use indexmap::IndexMap;
use netcmp_common::{Channel, Finding};

/// Receives findings as they are produced. Every method defaults to a no-op,
/// so implementors only override the channels they care about.
pub trait CompareListener {
    /// Informational phase markers (`General` findings).
    fn progress(&mut self, _finding: &Finding) {}
    /// Non-fatal anomalies (`Bad` findings).
    fn warning(&mut self, _finding: &Finding) {}
    /// Match and mismatch outcomes.
    fn status(&mut self, _finding: &Finding) {}
}

/// Adapts a closure into a [`CompareListener`] that sees every channel.
pub struct FnListener<F>(pub F);

impl<F> CompareListener for FnListener<F>
where
    F: FnMut(Channel, &Finding),
{
    fn progress(&mut self, finding: &Finding) {
        (self.0)(Channel::Progress, finding);
    }

    fn warning(&mut self, finding: &Finding) {
        (self.0)(Channel::Warning, finding);
    }

    fn status(&mut self, finding: &Finding) {
        (self.0)(Channel::Status, finding);
    }
}

/// Handle returned by listener registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct Listeners {
    next: u64,
    registered: IndexMap<ListenerId, Box<dyn CompareListener + Send>>,
}

impl Listeners {
    pub fn add(&mut self, listener: Box<dyn CompareListener + Send>) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.registered.insert(id, listener);
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.registered.shift_remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn dispatch(&mut self, finding: &Finding) {
        let channel = finding.channel();
        for listener in self.registered.values_mut() {
            match channel {
                Channel::Progress => listener.progress(finding),
                Channel::Warning => listener.warning(finding),
                Channel::Status => listener.status(finding),
            }
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("registered", &self.registered.keys().collect::<Vec<_>>())
            .finish()
    }
}
