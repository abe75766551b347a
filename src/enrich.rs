//! Section enrichment: expanding task nodes into the auxiliary nodes
//! the renderer groups beneath them.

use crate::graph::LineageGraph;
use crate::node::{LineageNode, NodeId, SectionKind};

/// For every task node, synthesize one section node per non-empty data
/// category (artifacts, hyperparameters, input models, output models).
///
/// Section ids derive deterministically from the owner id, so running
/// this on an already-enriched graph is a no-op.
pub fn add_section_nodes(graph: &mut LineageGraph) {
    let additions: Vec<LineageNode> = graph
        .nodes()
        .filter_map(|node| node.task_record().map(|record| (&node.id, record)))
        .flat_map(|(owner, record)| {
            SectionKind::ALL
                .into_iter()
                .filter(|kind| section_present(record, *kind))
                .map(|kind| LineageNode::section(kind, owner))
                .collect::<Vec<_>>()
        })
        .filter(|section| !graph.contains(&section.id))
        .collect();

    for section in additions {
        graph.insert(section);
    }
}

fn section_present(record: &crate::entity::TaskRecord, kind: SectionKind) -> bool {
    match kind {
        SectionKind::Artifacts => !record.execution.artifacts.is_empty(),
        SectionKind::Hyperparams => record.has_hyperparams(),
        SectionKind::InputModels => !record.models.input.is_empty(),
        SectionKind::OutputModels => !record.models.output.is_empty(),
    }
}

/// Section node ids owned by the given task, in declaration order.
pub fn sections_of<'a>(graph: &'a LineageGraph, owner: &NodeId) -> Vec<&'a NodeId> {
    SectionKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let id = kind.node_id(owner);
            graph.get(&id).map(|node| &node.id)
        })
        .collect()
}
