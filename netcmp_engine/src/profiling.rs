//! Scoped phase timers, compiled in with the `profiling` feature.
//!
//! Without the feature `Timer` is a zero-sized no-op and `report` returns an
//! empty table.

/// One row of the timing table: phase label, calls, total nanoseconds.
pub type PhaseStat = (&'static str, u64, u128);

#[cfg(feature = "profiling")]
mod enabled {
    use std::sync::OnceLock;
    use std::time::Instant;

    use dashmap::DashMap;

    use super::PhaseStat;

    static PHASES: OnceLock<DashMap<&'static str, (u64, u128)>> = OnceLock::new();

    fn phases() -> &'static DashMap<&'static str, (u64, u128)> {
        PHASES.get_or_init(DashMap::new)
    }

    /// Adds the time between construction and drop to the phase's total.
    pub struct Timer {
        phase: &'static str,
        start: Instant,
    }

    impl Timer {
        #[inline]
        pub fn new(phase: &'static str) -> Self {
            Self {
                phase,
                start: Instant::now(),
            }
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let nanos = self.start.elapsed().as_nanos();
            let mut entry = phases().entry(self.phase).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += nanos;
        }
    }

    /// Phases sorted by total time, slowest first. Also logged at info level.
    pub fn report() -> Vec<PhaseStat> {
        let mut rows: Vec<PhaseStat> = phases()
            .iter()
            .map(|kv| (*kv.key(), kv.value().0, kv.value().1))
            .collect();
        rows.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

        for (phase, calls, total) in &rows {
            tracing::info!(
                "{:<32} calls={:<8} total={:>10.3} ms",
                phase,
                calls,
                *total as f64 / 1_000_000.0
            );
        }
        rows
    }
}

#[cfg(not(feature = "profiling"))]
mod disabled {
    use super::PhaseStat;

    #[derive(Clone, Copy)]
    pub struct Timer;

    impl Timer {
        #[inline]
        pub const fn new(_: &'static str) -> Self {
            Self
        }
    }

    pub const fn report() -> Vec<PhaseStat> {
        Vec::new()
    }
}

#[cfg(feature = "profiling")]
pub use enabled::*;

#[cfg(not(feature = "profiling"))]
pub use disabled::*;

#[cfg(all(test, feature = "profiling"))]
mod tests {
    use super::*;

    #[test]
    fn test_timer_records_phase() {
        {
            let _t = Timer::new("profiling::test");
        }
        let rows = report();
        let row = rows.iter().find(|r| r.0 == "profiling::test").unwrap();
        assert!(row.1 >= 1);
    }
}
