//! The vertices of a reconstructed lineage graph.
//!
//! Nodes live in an id-keyed arena ([`LineageGraph`](crate::LineageGraph))
//! and reference each other through [`NodeId`] lists rather than direct
//! pointers, so cycle safety during traversal reduces to a visited-set
//! check.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::entity::{ModelRecord, TaskRecord};

/// Identifier of a lineage node.
///
/// Task and model nodes reuse the store id verbatim; section nodes derive
/// a composite id from their owner (see [`SectionKind::node_id`]).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Arc<str>);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(Arc::from(value))
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId(Arc::from(value.as_str()))
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// The four categories of auxiliary data a task node can be expanded
/// into by the section enricher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    Artifacts,
    Hyperparams,
    InputModels,
    OutputModels,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Artifacts,
        SectionKind::Hyperparams,
        SectionKind::InputModels,
        SectionKind::OutputModels,
    ];

    /// Stable id suffix used to derive section node ids.
    pub fn key(self) -> &'static str {
        match self {
            SectionKind::Artifacts => "artifacts",
            SectionKind::Hyperparams => "hyperparams",
            SectionKind::InputModels => "input-models",
            SectionKind::OutputModels => "output-models",
        }
    }

    /// Human-readable label for the view layer.
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::Artifacts => "Artifacts",
            SectionKind::Hyperparams => "Hyperparameters",
            SectionKind::InputModels => "Input models",
            SectionKind::OutputModels => "Output models",
        }
    }

    /// Derive the section node id for the given owner task.
    /// The derivation is stable, which is what makes enrichment idempotent.
    pub fn node_id(self, owner: &NodeId) -> NodeId {
        NodeId::from(format!("{}-{}", owner, self.key()))
    }
}

/// Payload of a lineage node. Each variant carries only the data its
/// kind needs.
#[derive(Debug, Clone)]
pub enum NodePayload {
    /// An experiment task, with its record snapshot.
    Task(Arc<TaskRecord>),
    /// A model produced by a task, with its record snapshot.
    Model(Arc<ModelRecord>),
    /// A synthetic grouping node for one category of a task's data.
    Section { kind: SectionKind, owner: NodeId },
}

/// Flat tag distinguishing node behavior in the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Task,
    Model,
    Artifacts,
    Hyperparams,
    InputModels,
    OutputModels,
}

/// A vertex in the reconstructed lineage graph.
#[derive(Debug, Clone)]
pub struct LineageNode {
    pub id: NodeId,
    pub payload: NodePayload,
    /// Ordered, deduplicated ids of the nodes this one descends from.
    /// Multiple parents are allowed; this is a DAG, not a tree.
    pub parent_ids: Vec<NodeId>,
    /// Layer assigned by the leveler; `None` until leveling runs, and
    /// permanently `None` for section and model nodes, which render
    /// inside their owner's cluster.
    pub level: Option<u32>,
    /// Hyperparameter keys that differ from the parent that produced
    /// this node. `Some(vec![])` means compared with no drift found.
    pub changed_keys: Option<Vec<String>>,
}

impl LineageNode {
    pub(crate) fn task(record: Arc<TaskRecord>) -> Self {
        Self {
            id: NodeId::from(record.id.as_str()),
            payload: NodePayload::Task(record),
            parent_ids: Vec::new(),
            level: None,
            changed_keys: None,
        }
    }

    pub(crate) fn model(record: Arc<ModelRecord>, owner: &NodeId) -> Self {
        Self {
            id: NodeId::from(record.id.as_str()),
            payload: NodePayload::Model(record),
            parent_ids: vec![owner.clone()],
            level: None,
            changed_keys: None,
        }
    }

    pub(crate) fn section(kind: SectionKind, owner: &NodeId) -> Self {
        Self {
            id: kind.node_id(owner),
            payload: NodePayload::Section {
                kind,
                owner: owner.clone(),
            },
            parent_ids: vec![owner.clone()],
            level: None,
            changed_keys: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match &self.payload {
            NodePayload::Task(_) => NodeKind::Task,
            NodePayload::Model(_) => NodeKind::Model,
            NodePayload::Section { kind, .. } => match kind {
                SectionKind::Artifacts => NodeKind::Artifacts,
                SectionKind::Hyperparams => NodeKind::Hyperparams,
                SectionKind::InputModels => NodeKind::InputModels,
                SectionKind::OutputModels => NodeKind::OutputModels,
            },
        }
    }

    pub fn is_task(&self) -> bool {
        matches!(self.payload, NodePayload::Task(_))
    }

    pub fn task_record(&self) -> Option<&TaskRecord> {
        match &self.payload {
            NodePayload::Task(record) => Some(record),
            _ => None,
        }
    }

    pub fn model_record(&self) -> Option<&ModelRecord> {
        match &self.payload {
            NodePayload::Model(record) => Some(record),
            _ => None,
        }
    }

    /// For section nodes, the task node this one was derived from.
    pub fn section_owner(&self) -> Option<&NodeId> {
        match &self.payload {
            NodePayload::Section { owner, .. } => Some(owner),
            _ => None,
        }
    }

    /// Append a parent edge, preserving insertion order and skipping
    /// ids already present.
    pub(crate) fn push_parent(&mut self, id: NodeId) {
        if !self.parent_ids.contains(&id) {
            self.parent_ids.push(id);
        }
    }
}
