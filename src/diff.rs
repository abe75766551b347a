//! Hyperparameter drift detection between a parent task and a task
//! derived from it.

use crate::entity::{HyperParams, TaskRecord};

/// Compare two hyperparameter snapshots and return the keys that differ,
/// as ordered `"{section}.{key}"` strings.
///
/// The walk covers every section present on the *child*; a key the child
/// has and the parent lacks counts as changed, while keys only the parent
/// has are ignored (they no longer exist on the derived task). Values
/// compare by JSON value equality, never by reference. Pure function —
/// identical inputs always yield the identical ordered list.
pub fn diff_params(parent: &HyperParams, child: &HyperParams) -> Vec<String> {
    let mut changed = Vec::new();

    for (section, entries) in child {
        let base = parent.get(section);
        for (key, entry) in entries {
            match base.and_then(|b| b.get(key)) {
                Some(prev) if prev.value == entry.value => {}
                _ => changed.push(format!("{section}.{key}")),
            }
        }
    }

    changed
}

/// Drift between two task records, attached by the builder to the child
/// node of the edge.
pub fn changed_keys(parent: &TaskRecord, child: &TaskRecord) -> Vec<String> {
    diff_params(&parent.hyperparams, &child.hyperparams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TaskRecord;

    #[test]
    fn equal_snapshots_yield_no_drift() {
        let parent = TaskRecord::new("p", "p")
            .with_param("opt", "lr", 0.1)
            .with_param("opt", "momentum", 0.9);
        let child = TaskRecord::new("c", "c")
            .with_param("opt", "lr", 0.1)
            .with_param("opt", "momentum", 0.9);

        assert!(changed_keys(&parent, &child).is_empty());
    }

    #[test]
    fn altered_value_is_reported() {
        let parent = TaskRecord::new("p", "p").with_param("opt", "lr", 0.1);
        let child = TaskRecord::new("c", "c").with_param("opt", "lr", 0.01);

        assert_eq!(changed_keys(&parent, &child), ["opt.lr"]);
    }

    #[test]
    fn key_missing_on_parent_counts_as_changed() {
        let parent = TaskRecord::new("p", "p").with_param("opt", "lr", 0.1);
        let child = TaskRecord::new("c", "c")
            .with_param("opt", "lr", 0.1)
            .with_param("data", "batch", 64);

        assert_eq!(changed_keys(&parent, &child), ["data.batch"]);
    }

    #[test]
    fn key_missing_on_child_is_ignored() {
        let parent = TaskRecord::new("p", "p")
            .with_param("opt", "lr", 0.1)
            .with_param("opt", "momentum", 0.9);
        let child = TaskRecord::new("c", "c").with_param("opt", "lr", 0.1);

        assert!(changed_keys(&parent, &child).is_empty());
    }

    #[test]
    fn order_is_deterministic_across_calls() {
        let parent = TaskRecord::new("p", "p");
        let child = TaskRecord::new("c", "c")
            .with_param("zeta", "b", 2)
            .with_param("alpha", "a", 1)
            .with_param("alpha", "z", 3);

        let first = changed_keys(&parent, &child);
        let second = changed_keys(&parent, &child);

        assert_eq!(first, ["alpha.a", "alpha.z", "zeta.b"]);
        assert_eq!(first, second);
    }

    #[test]
    fn value_equality_is_structural() {
        let parent = TaskRecord::new("p", "p").with_param(
            "aug",
            "crop",
            serde_json::json!({ "w": 224, "h": 224 }),
        );
        let child = TaskRecord::new("c", "c").with_param(
            "aug",
            "crop",
            serde_json::json!({ "w": 224, "h": 224 }),
        );

        assert!(changed_keys(&parent, &child).is_empty());
    }
}
