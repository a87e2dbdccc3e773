//! Selector for the two graphs taking part in a comparison.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::CompareError;

/// One of the two graphs being compared.
///
/// Graph numbers on the outer interface are `0` and `1`; anything else is
/// rejected by [`GraphIndex::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GraphIndex {
    /// Graph number 0, typically the schematic.
    First,
    /// Graph number 1, typically the extracted layout.
    Second,
}

impl GraphIndex {
    /// Both graphs, in graph-number order.
    pub const BOTH: [Self; 2] = [Self::First, Self::Second];

    /// The graph number as a `usize`, suitable for indexing `[T; 2]`.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// The opposite graph.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

impl TryFrom<usize> for GraphIndex {
    type Error = CompareError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::First),
            1 => Ok(Self::Second),
            other => Err(CompareError::InvalidGraphIndex(other)),
        }
    }
}

impl From<GraphIndex> for usize {
    fn from(value: GraphIndex) -> Self {
        value.as_usize()
    }
}

impl Display for GraphIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_usize())
    }
}
