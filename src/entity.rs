//! Record types mirroring the remote entity store's wire format.
//!
//! Every record is an immutable snapshot copied at fetch time. The engine
//! never mutates one in place; nodes hold them behind [`Arc`](std::sync::Arc)
//! and a new traversal fetches fresh copies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Execution status reported by the store for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Created,
    Queued,
    InProgress,
    Stopped,
    Completed,
    Failed,
    Published,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One hyperparameter entry. The store models parameters as
/// `section → name → entry`, where the entry value is an arbitrary
/// JSON scalar or structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParamEntry {
    #[serde(default)]
    pub value: Value,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamEntry {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }
}

/// Nested hyperparameter snapshot: section → key → entry.
///
/// `BTreeMap` keeps iteration order stable, which is what makes drift
/// detection deterministic across calls.
pub type HyperParams = BTreeMap<String, BTreeMap<String, ParamEntry>>;

/// Reference to the task this task was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A single artifact registered on a task's execution section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Artifact {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Execution section of a task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Execution {
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// Lightweight reference to a model attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Input and output model lists of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaskModels {
    #[serde(default)]
    pub input: Vec<ModelRef>,
    #[serde(default)]
    pub output: Vec<ModelRef>,
}

/// Output section of a task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaskOutput {
    /// The model this task produced, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// A task record as returned by the entity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub hyperparams: HyperParams,
    #[serde(default)]
    pub execution: Execution,
    #[serde(default)]
    pub models: TaskModels,
    #[serde(default)]
    pub output: TaskOutput,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent: None,
            project: None,
            status: TaskStatus::default(),
            hyperparams: HyperParams::default(),
            execution: Execution::default(),
            models: TaskModels::default(),
            output: TaskOutput::default(),
        }
    }

    pub fn with_parent(mut self, id: impl Into<String>) -> Self {
        self.parent = Some(ParentRef {
            id: id.into(),
            name: None,
        });
        self
    }

    pub fn with_project(mut self, id: impl Into<String>) -> Self {
        self.project = Some(id.into());
        self
    }

    pub fn with_param(
        mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.hyperparams
            .entry(section.into())
            .or_default()
            .insert(key.into(), ParamEntry::new(value));
        self
    }

    pub fn with_artifact(mut self, key: impl Into<String>) -> Self {
        self.execution.artifacts.push(Artifact {
            key: key.into(),
            ..Artifact::default()
        });
        self
    }

    pub fn with_input_model(mut self, id: impl Into<String>) -> Self {
        self.models.input.push(ModelRef {
            id: id.into(),
            name: None,
        });
        self
    }

    pub fn with_output_model(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.models.output.push(ModelRef {
            id: id.clone(),
            name: None,
        });
        self.output.model = Some(id);
        self
    }

    /// Id of the task this one descends from, if any.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_ref().map(|p| p.id.as_str())
    }

    /// True when at least one hyperparameter section has entries.
    pub fn has_hyperparams(&self) -> bool {
        self.hyperparams.values().any(|section| !section.is_empty())
    }
}

/// A model record as returned by the entity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(default)]
    pub last_metrics: BTreeMap<String, Value>,
}

impl ModelRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            uri: None,
            framework: None,
            last_metrics: BTreeMap::new(),
        }
    }
}
