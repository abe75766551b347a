//! Graph construction: walking ancestors and descendants of a root task
//! over the remote entity store.
//!
//! Both walks share one frontier and one visited set, so a node reached
//! twice (diamond ancestry, or a cyclic parent chain in bad data) is
//! admitted exactly once. Every fetch is awaited before the next one is
//! issued; dropping the returned future abandons the in-progress map
//! whole, nothing is partially committed.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::diff;
use crate::entity::TaskRecord;
use crate::graph::LineageGraph;
use crate::node::{LineageNode, NodeId};
use crate::store::EntityStore;

/// Pending traversal work.
enum Step {
    /// Follow the task's `parent` link upward.
    Up(NodeId),
    /// Reverse-lookup tasks whose `parent` names this task.
    Down(NodeId),
}

pub(crate) struct Traversal<'a, S> {
    store: &'a S,
    nodes: LineageGraph,
    visited: HashSet<NodeId>,
    frontier: VecDeque<Step>,
}

impl<'a, S: EntityStore> Traversal<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            nodes: LineageGraph::new(),
            visited: HashSet::new(),
            frontier: VecDeque::new(),
        }
    }

    /// Walk the lineage reachable from `root` and return the node map.
    ///
    /// A missing or unfetchable root yields an empty graph; any other
    /// failed lookup truncates just that branch.
    pub async fn run(mut self, root: &str) -> LineageGraph {
        let Some(record) = self.fetch_task(root).await else {
            debug!(root, "root task unresolved, returning empty lineage");
            return self.nodes;
        };

        let id = self.admit(record).await;
        self.frontier.push_back(Step::Up(id.clone()));
        self.frontier.push_back(Step::Down(id));

        while let Some(step) = self.frontier.pop_front() {
            match step {
                Step::Up(id) => self.walk_up(id).await,
                Step::Down(id) => self.walk_down(id).await,
            }
        }

        self.nodes.retain_valid_parents();
        self.nodes
    }

    /// Insert a task node, mark it visited, and resolve its output
    /// model. Returns the node id.
    async fn admit(&mut self, record: Arc<TaskRecord>) -> NodeId {
        let id = NodeId::from(record.id.as_str());
        self.visited.insert(id.clone());
        self.nodes.insert(LineageNode::task(record.clone()));
        self.attach_output_model(&id, &record).await;
        id
    }

    async fn walk_up(&mut self, child: NodeId) {
        let parent_id = self
            .nodes
            .get(&child)
            .and_then(LineageNode::task_record)
            .and_then(TaskRecord::parent_id)
            .map(str::to_owned);
        let Some(parent_id) = parent_id else { return };

        let parent = NodeId::from(parent_id.as_str());
        if self.visited.contains(&parent) {
            self.wire(&parent, &child);
            return;
        }

        // Branch truncates here when the parent cannot be resolved.
        let Some(record) = self.fetch_task(&parent_id).await else {
            return;
        };
        let parent = self.admit(record).await;
        self.wire(&parent, &child);
        self.frontier.push_back(Step::Up(parent));
    }

    async fn walk_down(&mut self, parent: NodeId) {
        let children = match self.store.children_of(parent.as_str()).await {
            Ok(children) => children,
            Err(error) => {
                warn!(task = %parent, %error, "child lookup failed, truncating branch");
                return;
            }
        };

        for record in children {
            let child = NodeId::from(record.id.as_str());
            if self.visited.contains(&child) {
                self.wire(&parent, &child);
                continue;
            }

            let child = self.admit(record).await;
            self.wire(&parent, &child);
            self.frontier.push_back(Step::Down(child));
        }
    }

    async fn attach_output_model(&mut self, owner: &NodeId, record: &TaskRecord) {
        let Some(model_id) = record.output.model.as_deref() else {
            return;
        };

        let id = NodeId::from(model_id);
        if self.visited.contains(&id) {
            // Same model produced along another path; add the edge.
            if let Some(node) = self.nodes.get_mut(&id) {
                node.push_parent(owner.clone());
            }
            return;
        }

        match self.store.model(model_id).await {
            Ok(Some(model)) => {
                self.visited.insert(id.clone());
                self.nodes.insert(LineageNode::model(model, owner));
            }
            Ok(None) => debug!(model = model_id, "output model not found"),
            Err(error) => warn!(model = model_id, %error, "model fetch failed"),
        }
    }

    /// Record the `parent → child` edge and, the first time a child
    /// gains a parent, attach the hyperparameter diff against it.
    fn wire(&mut self, parent: &NodeId, child: &NodeId) {
        let changed = {
            let parent_record = self.nodes.get(parent).and_then(LineageNode::task_record);
            let child_node = self.nodes.get(child);
            match (parent_record, child_node) {
                (Some(p), Some(node)) if node.changed_keys.is_none() => node
                    .task_record()
                    .map(|c| diff::changed_keys(p, c)),
                _ => None,
            }
        };

        if let Some(node) = self.nodes.get_mut(child) {
            node.push_parent(parent.clone());
            if let Some(changed) = changed {
                node.changed_keys = Some(changed);
            }
        }
    }

    async fn fetch_task(&self, id: &str) -> Option<Arc<TaskRecord>> {
        match self.store.task(id).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                debug!(task = id, "task not found");
                None
            }
            Err(error) => {
                warn!(task = id, %error, "task fetch failed, truncating branch");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ModelRecord;
    use crate::store::MemoryStore;

    fn ids(graph: &LineageGraph) -> Vec<String> {
        let mut ids: Vec<_> = graph.nodes().map(|n| n.id.as_str().to_owned()).collect();
        ids.sort();
        ids
    }

    async fn lineage(store: &MemoryStore, root: &str) -> LineageGraph {
        Traversal::new(store).run(root).await
    }

    #[tokio::test]
    async fn missing_root_yields_empty_graph() {
        let store = MemoryStore::new();
        let graph = lineage(&store, "ghost").await;
        assert!(graph.is_empty());
    }

    #[tokio::test]
    async fn ancestors_and_descendants_are_both_collected() {
        let mut store = MemoryStore::new();
        store
            .insert_task(TaskRecord::new("gp", "grandparent"))
            .insert_task(TaskRecord::new("p", "parent").with_parent("gp"))
            .insert_task(TaskRecord::new("root", "root").with_parent("p"))
            .insert_task(TaskRecord::new("c", "child").with_parent("root"))
            .insert_task(TaskRecord::new("gc", "grandchild").with_parent("c"));

        let graph = lineage(&store, "root").await;

        assert_eq!(ids(&graph), ["c", "gc", "gp", "p", "root"]);
        let child = graph.get(&NodeId::from("c")).unwrap();
        assert_eq!(child.parent_ids, vec![NodeId::from("root")]);
    }

    #[tokio::test]
    async fn cyclic_parent_chain_terminates() {
        let mut store = MemoryStore::new();
        store
            .insert_task(TaskRecord::new("a", "a").with_parent("b"))
            .insert_task(TaskRecord::new("b", "b").with_parent("a"));

        let graph = lineage(&store, "a").await;

        assert_eq!(ids(&graph), ["a", "b"]);
        let a = graph.get(&NodeId::from("a")).unwrap();
        let b = graph.get(&NodeId::from("b")).unwrap();
        assert_eq!(a.parent_ids, vec![NodeId::from("b")]);
        assert_eq!(b.parent_ids, vec![NodeId::from("a")]);
    }

    #[tokio::test]
    async fn no_duplicate_nodes_across_paths() {
        // Two children of the root share a descendant-walk frontier with
        // the ancestor chain; every id must appear exactly once.
        let mut store = MemoryStore::new();
        store
            .insert_task(TaskRecord::new("top", "top"))
            .insert_task(TaskRecord::new("root", "root").with_parent("top"))
            .insert_task(TaskRecord::new("s", "sibling").with_parent("top"))
            .insert_task(TaskRecord::new("c1", "c1").with_parent("root"))
            .insert_task(TaskRecord::new("c2", "c2").with_parent("root"));

        let graph = lineage(&store, "root").await;

        // `s` is reachable only up-then-down, which the walks do not do.
        assert_eq!(ids(&graph), ["c1", "c2", "root", "top"]);
    }

    #[tokio::test]
    async fn failed_branch_is_truncated_not_fatal() {
        let mut store = MemoryStore::new();
        store
            .insert_task(TaskRecord::new("gp", "grandparent"))
            .insert_task(TaskRecord::new("p", "parent").with_parent("gp"))
            .insert_task(TaskRecord::new("root", "root").with_parent("p"))
            .insert_task(TaskRecord::new("c", "child").with_parent("root"));
        store.poison("p");

        let graph = lineage(&store, "root").await;

        // The ancestor branch stops at the failing fetch; the rest of
        // the graph is still delivered.
        assert_eq!(ids(&graph), ["c", "root"]);
        let root = graph.get(&NodeId::from("root")).unwrap();
        assert!(root.parent_ids.is_empty());
    }

    #[tokio::test]
    async fn output_models_become_nodes() {
        let mut store = MemoryStore::new();
        store
            .insert_task(TaskRecord::new("t", "train").with_output_model("m"))
            .insert_model(ModelRecord::new("m", "weights"));

        let graph = lineage(&store, "t").await;

        assert_eq!(ids(&graph), ["m", "t"]);
        let model = graph.get(&NodeId::from("m")).unwrap();
        assert!(model.model_record().is_some());
        assert_eq!(model.parent_ids, vec![NodeId::from("t")]);
    }

    #[tokio::test]
    async fn unresolvable_model_is_skipped() {
        let mut store = MemoryStore::new();
        store.insert_task(TaskRecord::new("t", "train").with_output_model("m"));

        let graph = lineage(&store, "t").await;

        assert_eq!(ids(&graph), ["t"]);
    }

    #[tokio::test]
    async fn drift_is_attached_to_the_child() {
        let mut store = MemoryStore::new();
        store
            .insert_task(TaskRecord::new("p", "parent").with_param("opt", "lr", 0.1))
            .insert_task(
                TaskRecord::new("c", "child")
                    .with_parent("p")
                    .with_param("opt", "lr", 0.01),
            );

        let graph = lineage(&store, "p").await;

        let child = graph.get(&NodeId::from("c")).unwrap();
        assert_eq!(child.changed_keys.as_deref(), Some(&["opt.lr".to_owned()][..]));
        let parent = graph.get(&NodeId::from("p")).unwrap();
        assert_eq!(parent.changed_keys, None);
    }
}
