//! Forest decomposition: splitting a merged node set into independent
//! lineage trees.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::LineageGraph;
use crate::node::NodeId;

/// Maximal connected components of the graph, as sorted id sets.
///
/// Connectivity treats `parent_ids` as undirected edges, so a task, its
/// ancestors, its descendants and all their section/model nodes land in
/// the same component. Components are ordered by their smallest node id.
pub fn components(graph: &LineageGraph) -> Vec<Vec<NodeId>> {
    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for node in graph.nodes() {
        adjacency.entry(&node.id).or_default();
        for parent in &node.parent_ids {
            adjacency.entry(&node.id).or_default().push(parent);
            adjacency.entry(parent).or_default().push(&node.id);
        }
    }

    let mut order: Vec<&NodeId> = graph.nodes().map(|node| &node.id).collect();
    order.sort();

    let mut seen: HashSet<&NodeId> = HashSet::new();
    let mut result = Vec::new();

    for start in order {
        if seen.contains(start) {
            continue;
        }

        let mut component = Vec::new();
        let mut frontier = VecDeque::from([start]);
        seen.insert(start);

        while let Some(id) = frontier.pop_front() {
            component.push(id.clone());
            for &neighbor in adjacency.get(id).into_iter().flatten() {
                if seen.insert(neighbor) {
                    frontier.push_back(neighbor);
                }
            }
        }

        component.sort();
        result.push(component);
    }

    result
}

/// Split the graph into its connected components. Every node of the
/// input ends up in exactly one returned graph.
pub fn partition(mut graph: LineageGraph) -> Vec<LineageGraph> {
    let groups = components(&graph);

    groups
        .into_iter()
        .map(|ids| {
            ids.into_iter()
                .filter_map(|id| graph.remove(&id))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entity::TaskRecord;
    use crate::node::LineageNode;

    fn graph(edges: &[(&str, &[&str])]) -> LineageGraph {
        edges
            .iter()
            .map(|(id, parents)| {
                let mut node = LineageNode::task(Arc::new(TaskRecord::new(*id, *id)));
                for parent in *parents {
                    node.push_parent(NodeId::from(*parent));
                }
                node
            })
            .collect()
    }

    #[test]
    fn unrelated_roots_split_apart() {
        let graph = graph(&[("a", &[]), ("b", &[])]);
        let parts = partition(graph);

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), 1);
        assert_eq!(parts[1].len(), 1);
    }

    #[test]
    fn ancestry_keeps_a_component_together() {
        let graph = graph(&[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["b"]),
            ("x", &[]),
            ("y", &["x"]),
        ]);
        let parts = partition(graph);

        assert_eq!(parts.len(), 2);
        let sizes: Vec<_> = parts.iter().map(LineageGraph::len).collect();
        assert_eq!(sizes, [3, 2]);
    }

    #[test]
    fn shared_ancestor_joins_branches() {
        // Two leaves meeting in a common ancestor form one component.
        let graph = graph(&[("root", &[]), ("l", &["root"]), ("r", &["root"])]);
        let parts = partition(graph);

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 3);
    }

    #[test]
    fn union_of_components_is_the_input_exactly() {
        let source = graph(&[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &[]),
            ("d", &["c"]),
            ("e", &[]),
        ]);
        let mut expected: Vec<_> = source.ids();
        expected.sort();

        let parts = partition(source);
        let mut collected: Vec<NodeId> = parts
            .iter()
            .flat_map(|part| part.ids())
            .collect();
        collected.sort();

        assert_eq!(collected, expected);

        // No id in two components.
        let unique: HashSet<_> = collected.iter().collect();
        assert_eq!(unique.len(), collected.len());
    }

    #[test]
    fn component_order_is_deterministic() {
        let graph = graph(&[("m", &[]), ("a", &[]), ("z", &[])]);
        let groups = components(&graph);

        let firsts: Vec<_> = groups
            .iter()
            .map(|ids| ids[0].as_str().to_owned())
            .collect();
        assert_eq!(firsts, ["a", "m", "z"]);
    }
}
