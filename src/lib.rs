#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod build;
mod diff;
mod enrich;
mod entity;
mod error;
mod forest;
mod graph;
mod level;
mod node;
mod route;
mod store;
mod view;

use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};
use tracing::{Instrument, debug, warn};

use crate::build::Traversal;

pub use crate::diff::{changed_keys, diff_params};
pub use crate::enrich::{add_section_nodes, sections_of};
pub use crate::entity::{
    Artifact, Execution, HyperParams, ModelRecord, ModelRef, ParamEntry, ParentRef, TaskModels,
    TaskOutput, TaskRecord, TaskStatus,
};
pub use crate::error::StoreError;
pub use crate::forest::{components, partition};
pub use crate::graph::LineageGraph;
pub use crate::level::compute_levels;
pub use crate::node::{LineageNode, NodeId, NodeKind, NodePayload, SectionKind};
pub use crate::route::{EdgePath, Point, Rect, route_edge};
pub use crate::store::{EntityStore, MemoryStore};
pub use crate::view::{ClusterView, EdgeView, LineageView, NodeView};

/// The lineage engine: traversal, enrichment, drift annotation and
/// leveling over an [`EntityStore`].
///
/// The engine is stateless between calls — every invocation builds a
/// fresh node map and hands it off whole. Abandoning a returned future
/// (e.g. the user navigated away) simply drops the in-progress map.
pub struct LineageEngine<S> {
    store: S,
}

impl<S: EntityStore> LineageEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconstruct the lineage of a single task: ancestors, descendants,
    /// derived models, section nodes and levels.
    ///
    /// An unresolvable root yields an empty graph. Any other failed
    /// lookup truncates just its branch — the result is the best-effort
    /// reachable subgraph, never an error.
    pub async fn task_lineage(&self, root: &str) -> LineageGraph {
        let span = tracing::info_span!("task_lineage", root);
        async {
            let mut graph = Traversal::new(&self.store).run(root).await;
            enrich::add_section_nodes(&mut graph);
            level::assign_levels(&mut graph);
            debug!(nodes = graph.len(), "lineage assembled");
            graph
        }
        .instrument(span)
        .await
    }

    /// Reconstruct the lineage of every task in a project and split the
    /// merged result into independent trees, each leveled on its own.
    ///
    /// Components are ordered by their smallest node id. A failing
    /// project listing degrades to an empty result.
    pub async fn project_lineage(&self, project: &str) -> Vec<LineageGraph> {
        let span = tracing::info_span!("project_lineage", project);
        async {
            let tasks = match self.store.project_tasks(project).await {
                Ok(tasks) => tasks,
                Err(error) => {
                    warn!(%error, "project listing failed");
                    return Vec::new();
                }
            };

            let mut merged = LineageGraph::new();
            for task in &tasks {
                let graph = Traversal::new(&self.store).run(&task.id).await;
                merged.merge(graph);
            }
            merged.retain_valid_parents();
            enrich::add_section_nodes(&mut merged);

            let mut parts = forest::partition(merged);
            parts
                .par_iter_mut()
                .for_each(|part| level::assign_levels(part));

            debug!(components = parts.len(), "project lineage assembled");
            parts
        }
        .instrument(span)
        .await
    }
}

/// Install a default `tracing` subscriber reading `RUST_LOG`.
#[cfg(feature = "logging")]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
