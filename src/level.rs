//! Bottom-up layer assignment over the task sub-DAG.
//!
//! A node's level is its distance from the *leaves*, not from the roots:
//! a task no other task descends from sits at level 0, and every parent
//! sits at least one layer above its deepest child. Root tasks therefore
//! float to the top of the rendered diagram. This orientation is a
//! deliberate layout choice and must not be inverted.

use std::collections::{HashMap, VecDeque};

use crate::graph::LineageGraph;
use crate::node::{NodeId, NodePayload};

/// Compute the level of every task node: seed the queue with childless
/// tasks at level 0, then propagate `level(parent) =
/// max(level(parent), level(child) + 1)` upward until the frontier
/// drains. Tasks never reached (members of a parent cycle) keep the
/// default level 0.
///
/// Only task nodes participate — section and model nodes hang off a task
/// and are placed with it by the view layer, so counting them as
/// children would push every productive task off the leaf layer.
pub fn compute_levels(graph: &LineageGraph) -> HashMap<NodeId, u32> {
    let mut child_count: HashMap<&NodeId, usize> = HashMap::new();
    let mut levels: HashMap<NodeId, u32> = HashMap::new();

    for node in graph.nodes().filter(|node| node.is_task()) {
        levels.insert(node.id.clone(), 0);
        for parent in &node.parent_ids {
            *child_count.entry(parent).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<NodeId> = {
        let mut leaves: Vec<_> = levels
            .keys()
            .filter(|id| !child_count.contains_key(id))
            .cloned()
            .collect();
        leaves.sort();
        leaves.into()
    };

    while let Some(id) = queue.pop_front() {
        let level = levels[&id];
        let parents = match graph.get(&id) {
            Some(node) => node.parent_ids.clone(),
            None => continue,
        };

        for parent in parents {
            // Parents of a task are tasks; anything else was pruned.
            let Some(slot) = levels.get_mut(&parent) else {
                continue;
            };
            *slot = (*slot).max(level + 1);

            let remaining = child_count
                .get_mut(&parent)
                .expect("parent has at least this child");
            *remaining -= 1;
            if *remaining == 0 {
                queue.push_back(parent);
            }
        }
    }

    levels
}

/// Run [`compute_levels`] and write the result back onto the nodes.
pub(crate) fn assign_levels(graph: &mut LineageGraph) {
    let levels = compute_levels(graph);
    for node in graph.nodes_mut() {
        if matches!(node.payload, NodePayload::Task(_)) {
            node.level = levels.get(&node.id).copied();
        }
    }
}
