//! Connectivity comparison of two device/net graphs.
//!
//! Two netlists (for example a schematic and an extracted layout) are
//! declared through a [`Compare`] engine. [`Compare::execute`] classifies
//! every device by its local wiring, refines the classes through shared
//! nets until they stop splitting, and pairs classes across the graphs. The
//! outcome is an ordered stream of [`Finding`]s: matches, devices with no
//! counterpart, groups of devices that structure alone cannot tell apart,
//! and unusable equate hints.
//!
//! ```ignore
//! use netcmp_engine::Compare;
//!
//! let mut cmp = Compare::new();
//! cmp.define_device_template("M1", &["a", "b", "c"])?;
//! cmp.define_instance(0, "M1", "I1", &["x", "y", "nc"])?;
//! cmp.define_instance(1, "M1", "I1", &["x", "y", "nc"])?;
//! assert!(cmp.execute()?.passed());
//! ```

mod builder;
mod classify;
mod compare;
mod index;
mod listener;
mod matcher;
mod refine;
mod report;

pub mod profiling;
pub mod test_harness;

pub use compare::Compare;
pub use listener::{CompareListener, FnListener, ListenerId};
pub use refine::Label;
pub use report::Report;

pub use netcmp_common::{
    Channel, CompareError, Config, ConfigBuilder, Finding, FindingKind, GraphIndex, Payload,
    VertexKind, VertexRef,
};

pub(crate) use profiling::Timer;
