//! The boundary model handed to the rendering consumer.
//!
//! Everything downstream of this structure — box positioning, curve
//! drawing, click handling — belongs to the view layer. The engine only
//! promises stable, serialized `{nodes, edges, clusters}` content.

use serde::Serialize;

use crate::entity::TaskStatus;
use crate::graph::LineageGraph;
use crate::node::{NodeId, NodeKind, NodePayload};

/// Serialized lineage handed to the renderer.
#[derive(Debug, Serialize)]
pub struct LineageView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub clusters: Vec<ClusterView>,
}

/// One rendered node.
#[derive(Debug, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    pub parents: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_keys: Option<Vec<String>>,
}

/// One parent → child connection.
#[derive(Debug, Serialize)]
pub struct EdgeView {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    /// Number of hyperparameter keys that drifted on the target,
    /// omitted when nothing changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Grouping of a task with its section nodes, for visual clustering.
#[derive(Debug, Serialize)]
pub struct ClusterView {
    pub owner: NodeId,
    pub members: Vec<NodeId>,
}

impl LineageView {
    /// Project a graph into the renderer contract. Output order is
    /// deterministic: nodes, edges and clusters all sort by id.
    pub fn from_graph(graph: &LineageGraph) -> Self {
        let mut nodes: Vec<NodeView> = graph
            .nodes()
            .map(|node| {
                let (name, status, uri) = match &node.payload {
                    NodePayload::Task(record) => {
                        (record.name.clone(), Some(record.status), None)
                    }
                    NodePayload::Model(record) => {
                        (record.name.clone(), None, record.uri.clone())
                    }
                    NodePayload::Section { kind, .. } => {
                        (kind.label().to_owned(), None, None)
                    }
                };
                NodeView {
                    id: node.id.clone(),
                    kind: node.kind(),
                    name,
                    level: node.level,
                    parents: node.parent_ids.clone(),
                    status,
                    uri,
                    changed_keys: node.changed_keys.clone(),
                }
            })
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<EdgeView> = graph
            .nodes()
            // Section membership is expressed through clusters, not edges.
            .filter(|node| node.section_owner().is_none())
            .flat_map(|node| {
                let label = node
                    .changed_keys
                    .as_ref()
                    .filter(|keys| !keys.is_empty())
                    .map(|keys| keys.len().to_string());
                node.parent_ids.iter().map(move |parent| EdgeView {
                    id: format!("{parent}->{}", node.id),
                    source: parent.clone(),
                    target: node.id.clone(),
                    label: label.clone(),
                })
            })
            .collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));

        let mut clusters: Vec<ClusterView> = graph
            .nodes()
            .filter(|node| node.is_task())
            .filter_map(|task| {
                let members = crate::enrich::sections_of(graph, &task.id);
                if members.is_empty() {
                    return None;
                }
                Some(ClusterView {
                    owner: task.id.clone(),
                    members: members.into_iter().cloned().collect(),
                })
            })
            .collect();
        clusters.sort_by(|a, b| a.owner.cmp(&b.owner));

        Self {
            nodes,
            edges,
            clusters,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entity::TaskRecord;
    use crate::node::LineageNode;

    fn sample() -> LineageGraph {
        let mut graph: LineageGraph = [
            LineageNode::task(Arc::new(
                TaskRecord::new("t-1", "baseline").with_param("opt", "lr", 0.1),
            )),
            {
                let mut child = LineageNode::task(Arc::new(
                    TaskRecord::new("t-2", "finetune").with_parent("t-1"),
                ));
                child.push_parent(NodeId::from("t-1"));
                child.changed_keys = Some(vec!["opt.lr".into()]);
                child
            },
        ]
        .into_iter()
        .collect();
        crate::enrich::add_section_nodes(&mut graph);
        graph
    }

    #[test]
    fn edges_carry_the_drift_count_as_label() {
        let view = LineageView::from_graph(&sample());

        let edge = view
            .edges
            .iter()
            .find(|e| e.target.as_str() == "t-2")
            .unwrap();
        assert_eq!(edge.source.as_str(), "t-1");
        assert_eq!(edge.label.as_deref(), Some("1"));
    }

    #[test]
    fn section_membership_is_clusters_not_edges() {
        let view = LineageView::from_graph(&sample());

        assert!(
            view.edges
                .iter()
                .all(|e| !e.target.as_str().ends_with("-hyperparams"))
        );

        assert_eq!(view.clusters.len(), 1);
        let cluster = &view.clusters[0];
        assert_eq!(cluster.owner.as_str(), "t-1");
        assert_eq!(cluster.members[0].as_str(), "t-1-hyperparams");
    }

    #[test]
    fn serialization_shape_is_stable() {
        let view = LineageView::from_graph(&sample());
        let value = serde_json::to_value(&view).unwrap();

        let nodes = value["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0]["id"], "t-1");
        assert_eq!(nodes[0]["kind"], "task");
        assert_eq!(nodes[1]["kind"], "hyperparams");

        let edge = &value["edges"][0];
        assert_eq!(edge["source"], "t-1");
        assert_eq!(edge["target"], "t-2");
        assert_eq!(edge["label"], "1");
    }
}
