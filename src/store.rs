//! The fetch contract between the engine and the surrounding entity
//! store, plus an in-memory implementation used as the test collaborator
//! and for embedding without a remote backend.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::entity::{ModelRecord, TaskRecord};
use crate::error::StoreError;

/// Narrow, read-only contract against the platform's entity store.
///
/// Every method resolves a single lookup. Absence is a valid result
/// (`Ok(None)` / empty vec), not an error; [`StoreError`] is reserved for
/// lookups that could not be carried out at all. Timeouts, retries and
/// backoff are the adapter's concern — by the time a result reaches the
/// engine it is either usable or the branch is dropped.
///
/// The engine issues fetches strictly sequentially and never holds a
/// result across mutation of its own state, so implementations only need
/// `&self` access.
pub trait EntityStore {
    /// Resolve a task by id.
    fn task(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Arc<TaskRecord>>, StoreError>>;

    /// All tasks whose `parent.id` equals the given id. The engine
    /// treats the result as complete for that call.
    fn children_of(
        &self,
        parent_id: &str,
    ) -> impl Future<Output = Result<Vec<Arc<TaskRecord>>, StoreError>>;

    /// Resolve a model by id.
    fn model(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Arc<ModelRecord>>, StoreError>>;

    /// Bulk listing of a project's tasks, used by multi-root lineage.
    /// No ordering is assumed.
    fn project_tasks(
        &self,
        project_id: &str,
    ) -> impl Future<Output = Result<Vec<Arc<TaskRecord>>, StoreError>>;
}

/// In-memory [`EntityStore`] holding records behind `Arc` snapshots.
///
/// Besides serving as the fixture store in tests, it can back the engine
/// directly when the host application already has all records resident.
/// Individual ids can be poisoned to simulate backend failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: HashMap<String, Arc<TaskRecord>>,
    models: HashMap<String, Arc<ModelRecord>>,
    poisoned: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_task(&mut self, record: TaskRecord) -> &mut Self {
        self.tasks.insert(record.id.clone(), Arc::new(record));
        self
    }

    pub fn insert_model(&mut self, record: ModelRecord) -> &mut Self {
        self.models.insert(record.id.clone(), Arc::new(record));
        self
    }

    /// Make every lookup of this id fail with a backend error.
    pub fn poison(&mut self, id: impl Into<String>) -> &mut Self {
        self.poisoned.insert(id.into());
        self
    }

    fn check(&self, id: &str) -> Result<(), StoreError> {
        if self.poisoned.contains(id) {
            Err(StoreError::backend(format!("lookup of '{id}' failed")))
        } else {
            Ok(())
        }
    }
}

impl EntityStore for MemoryStore {
    async fn task(&self, id: &str) -> Result<Option<Arc<TaskRecord>>, StoreError> {
        self.check(id)?;
        Ok(self.tasks.get(id).cloned())
    }

    async fn children_of(&self, parent_id: &str) -> Result<Vec<Arc<TaskRecord>>, StoreError> {
        self.check(parent_id)?;
        let mut children: Vec<_> = self
            .tasks
            .values()
            .filter(|task| task.parent_id() == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(children)
    }

    async fn model(&self, id: &str) -> Result<Option<Arc<ModelRecord>>, StoreError> {
        self.check(id)?;
        Ok(self.models.get(id).cloned())
    }

    async fn project_tasks(&self, project_id: &str) -> Result<Vec<Arc<TaskRecord>>, StoreError> {
        self.check(project_id)?;
        let mut tasks: Vec<_> = self
            .tasks
            .values()
            .filter(|task| task.project.as_deref() == Some(project_id))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tasks)
    }
}
