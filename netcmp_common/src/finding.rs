//! Findings produced by a comparison run.
//!
//! A finding is one reported outcome: a match, a mismatch, a contradictory
//! hint, or an informational progress marker. Findings are emitted in
//! discovery order and never change once emitted.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::GraphIndex;

/// Outcome category of a finding.
///
/// The numeric codes follow the report categories of the comparison
/// backend and are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    /// Informational phase marker. Only emitted in trace mode.
    General,
    /// A vertex pair was matched across the graphs.
    Match,
    /// A contradictory or unusable equate hint.
    Bad,
    /// A vertex with no structural counterpart in the other graph.
    MismatchOther,
    /// Vertices that are indistinguishable by structure alone.
    MismatchSymmetry,
}

impl FindingKind {
    /// Stable numeric report code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::General => 0,
            Self::Match => 1,
            Self::Bad => 2,
            Self::MismatchOther => 3,
            Self::MismatchSymmetry => 4,
        }
    }

    /// The notification channel this kind is delivered on.
    #[must_use]
    pub const fn channel(self) -> Channel {
        match self {
            Self::General => Channel::Progress,
            Self::Bad => Channel::Warning,
            Self::Match | Self::MismatchOther | Self::MismatchSymmetry => Channel::Status,
        }
    }

    /// True for the outcomes that make a comparison fail.
    #[must_use]
    pub const fn is_mismatch(self) -> bool {
        matches!(self, Self::MismatchOther | Self::MismatchSymmetry)
    }
}

/// Kind of vertex a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VertexKind {
    /// A device instance.
    Device,
    /// A net (alias closure).
    Net,
}

/// Observer channel a finding is delivered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Informational phase markers.
    Progress,
    /// Non-fatal anomalies such as bad equate hints.
    Warning,
    /// Terminal match and mismatch outcomes.
    Status,
}

/// Opaque caller data attached to an instance.
///
/// The engine never inspects it; it is echoed back on every finding that
/// names the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Payload(pub u64);

/// A vertex named by a finding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexRef {
    /// Graph the vertex belongs to.
    pub graph: GraphIndex,
    /// Instance name, or the display name of a net.
    pub name: String,
    /// Caller payload of the instance, if one was supplied.
    pub payload: Option<Payload>,
}

impl VertexRef {
    /// Creates a reference without a payload.
    pub fn new(graph: GraphIndex, name: impl Into<String>) -> Self {
        Self {
            graph,
            name: name.into(),
            payload: None,
        }
    }
}

impl Display for VertexRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.graph, self.name)
    }
}

/// One reported outcome of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Outcome category.
    pub kind: FindingKind,
    /// Whether the finding is about devices or nets.
    pub vertex_kind: VertexKind,
    /// Originating graph, when the finding concerns a single graph.
    pub graph: Option<GraphIndex>,
    /// Human readable description.
    pub message: String,
    /// The implicated vertices, ordered by graph then name.
    pub vertices: Vec<VertexRef>,
}

impl Finding {
    /// Creates an informational finding with no implicated vertices.
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            kind: FindingKind::General,
            vertex_kind: VertexKind::Device,
            graph: None,
            message: message.into(),
            vertices: Vec::new(),
        }
    }

    /// Creates a device finding.
    pub fn device(
        kind: FindingKind,
        graph: Option<GraphIndex>,
        message: impl Into<String>,
        vertices: Vec<VertexRef>,
    ) -> Self {
        Self {
            kind,
            vertex_kind: VertexKind::Device,
            graph,
            message: message.into(),
            vertices,
        }
    }

    /// Creates a net finding.
    pub fn net(
        kind: FindingKind,
        graph: Option<GraphIndex>,
        message: impl Into<String>,
        vertices: Vec<VertexRef>,
    ) -> Self {
        Self {
            vertex_kind: VertexKind::Net,
            ..Self::device(kind, graph, message, vertices)
        }
    }

    /// Channel this finding is delivered on.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.kind.channel()
    }

    /// Returns true if the finding names `name` in `graph`.
    #[must_use]
    pub fn names(&self, graph: GraphIndex, name: &str) -> bool {
        self.vertices
            .iter()
            .any(|v| v.graph == graph && v.name == name)
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}
