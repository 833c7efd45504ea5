//! Structural validation of workflow definitions.
//!
//! A definition is checked in stages so the errors make sense on their own:
//!
//! 1. **Uniqueness**: node names are unique
//! 2. **Entry**: an entry node is set and registered
//! 3. **References**: every edge source and target, including label-map targets, exists
//! 4. **Edge shape**: at most one outgoing transition kind per node, no fan-out, no empty
//!    label maps
//! 5. **Reachability**: every node can be reached from the entry node
//!
//! Reachability is only checked once the first four stages pass, since walking the graph
//! needs resolvable references. All other stages accumulate errors, so one pass reports
//! every problem.
//!
//! # Examples
//!
//! ```rust
//! use lessonflow::config::{validate_workflow_graph, GraphOutline};
//! use lessonflow::errors::DefinitionError;
//!
//! let outline = GraphOutline {
//!     nodes: vec!["classify".into(), "generate".into(), "orphan".into()],
//!     entry: Some("classify".into()),
//!     edges: vec![("classify".into(), "generate".into())],
//!     branches: vec![],
//! };
//!
//! let errors = validate_workflow_graph(&outline).unwrap_err();
//! assert_eq!(
//!     errors,
//!     vec![DefinitionError::UnreachableNode { node: "orphan".into() }]
//! );
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use crate::engine::END;
use crate::errors::DefinitionError;

/// The shape of a workflow definition without its node bodies or routers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphOutline {
    /// Registered node names in registration order
    pub nodes: Vec<String>,
    pub entry: Option<String>,
    /// Unconditional edges as (from, to)
    pub edges: Vec<(String, String)>,
    /// Conditional edges as (from, [(label, target)])
    pub branches: Vec<(String, Vec<(String, String)>)>,
}

/// Validates a workflow graph for structural integrity and executability.
///
/// # Returns
///
/// * `Ok(())` - every node is declared once, reachable and has a well-formed transition
/// * `Err(Vec<DefinitionError>)` - every problem found
pub fn validate_workflow_graph(outline: &GraphOutline) -> Result<(), Vec<DefinitionError>> {
    let mut errors = Vec::new();

    errors.extend(validate_unique_nodes(outline));
    errors.extend(validate_entry(outline));
    errors.extend(validate_references(outline));
    errors.extend(validate_edge_shape(outline));

    if errors.is_empty() {
        errors.extend(validate_reachability(outline));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_nodes(outline: &GraphOutline) -> Vec<DefinitionError> {
    let mut seen = HashSet::new();
    outline
        .nodes
        .iter()
        .filter(|node| !seen.insert(node.as_str()))
        .map(|node| DefinitionError::DuplicateNode { node: node.clone() })
        .collect()
}

fn validate_entry(outline: &GraphOutline) -> Vec<DefinitionError> {
    match &outline.entry {
        None => vec![DefinitionError::MissingEntry],
        Some(entry) if !outline.nodes.contains(entry) => {
            vec![DefinitionError::UnknownEntry {
                entry: entry.clone(),
            }]
        }
        Some(_) => Vec::new(),
    }
}

/// Every edge source must be a node; every target must be a node or `END`.
///
/// An undeclared source is reported once, however many transitions leave it.
fn validate_references(outline: &GraphOutline) -> Vec<DefinitionError> {
    let declared: HashSet<&str> = outline.nodes.iter().map(String::as_str).collect();
    let mut errors = Vec::new();

    let sources = outline
        .edges
        .iter()
        .map(|(from, _)| from)
        .chain(outline.branches.iter().map(|(from, _)| from));
    let mut reported = HashSet::new();
    for from in sources {
        if !declared.contains(from.as_str()) && reported.insert(from.as_str()) {
            errors.push(DefinitionError::UndeclaredNode {
                from: from.clone(),
                missing: from.clone(),
            });
        }
    }

    let targets = outline.edges.iter().map(|(from, to)| (from, to)).chain(
        outline
            .branches
            .iter()
            .flat_map(|(from, labels)| labels.iter().map(move |(_, to)| (from, to))),
    );
    for (from, to) in targets {
        if to != END && !declared.contains(to.as_str()) {
            errors.push(DefinitionError::UndeclaredNode {
                from: from.clone(),
                missing: to.clone(),
            });
        }
    }

    errors
}

fn validate_edge_shape(outline: &GraphOutline) -> Vec<DefinitionError> {
    let mut errors = Vec::new();

    let mut direct: HashMap<&str, Vec<String>> = HashMap::new();
    for (from, to) in &outline.edges {
        direct.entry(from.as_str()).or_default().push(to.clone());
    }

    let mut fan_out: Vec<_> = direct.iter().filter(|(_, targets)| targets.len() > 1).collect();
    fan_out.sort_by_key(|(node, _)| *node);
    for (node, targets) in fan_out {
        errors.push(DefinitionError::FanOut {
            node: node.to_string(),
            targets: targets.clone(),
        });
    }

    let mut branched = HashSet::new();
    for (from, labels) in &outline.branches {
        if labels.is_empty() {
            errors.push(DefinitionError::EmptyLabelMap { node: from.clone() });
        }
        if direct.contains_key(from.as_str()) || !branched.insert(from.as_str()) {
            errors.push(DefinitionError::ConflictingEdges { node: from.clone() });
        }
    }

    errors
}

/// Breadth-first walk from the entry node over both edge kinds.
fn validate_reachability(outline: &GraphOutline) -> Vec<DefinitionError> {
    let Some(entry) = outline.entry.as_deref() else {
        return Vec::new();
    };

    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, to) in &outline.edges {
        successors.entry(from.as_str()).or_default().push(to.as_str());
    }
    for (from, labels) in &outline.branches {
        for (_, to) in labels {
            successors.entry(from.as_str()).or_default().push(to.as_str());
        }
    }

    let mut reached = HashSet::from([entry]);
    let mut queue = VecDeque::from([entry]);
    while let Some(node) = queue.pop_front() {
        for &next in successors.get(node).into_iter().flatten() {
            if next != END && reached.insert(next) {
                queue.push_back(next);
            }
        }
    }

    outline
        .nodes
        .iter()
        .filter(|node| !reached.contains(node.as_str()))
        .map(|node| DefinitionError::UnreachableNode { node: node.clone() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(nodes: &[&str], entry: Option<&str>, edges: &[(&str, &str)]) -> GraphOutline {
        GraphOutline {
            nodes: nodes.iter().map(|s| s.to_string()).collect(),
            entry: entry.map(str::to_string),
            edges: edges
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            branches: vec![],
        }
    }

    fn branch(from: &str, labels: &[(&str, &str)]) -> (String, Vec<(String, String)>) {
        (
            from.to_string(),
            labels
                .iter()
                .map(|(l, t)| (l.to_string(), t.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_valid_single_node() {
        assert!(validate_workflow_graph(&outline(&["a"], Some("a"), &[])).is_ok());
    }

    #[test]
    fn test_valid_linear_chain() {
        let graph = outline(&["a", "b", "c"], Some("a"), &[("a", "b"), ("b", "c")]);
        assert!(validate_workflow_graph(&graph).is_ok());
    }

    #[test]
    fn test_valid_cycle_through_router() {
        let mut graph = outline(&["think", "act", "done"], Some("think"), &[("act", "think")]);
        graph
            .branches
            .push(branch("think", &[("again", "act"), ("finish", "done")]));
        assert!(validate_workflow_graph(&graph).is_ok());
    }

    #[test]
    fn test_edges_to_end_are_valid() {
        let mut graph = outline(&["a", "b"], Some("a"), &[("b", END)]);
        graph.branches.push(branch("a", &[("go", "b"), ("stop", END)]));
        assert!(validate_workflow_graph(&graph).is_ok());
    }

    #[test]
    fn test_missing_entry() {
        let errors = validate_workflow_graph(&outline(&["a"], None, &[])).unwrap_err();
        assert_eq!(errors, vec![DefinitionError::MissingEntry]);
    }

    #[test]
    fn test_unknown_entry() {
        let errors = validate_workflow_graph(&outline(&["a"], Some("b"), &[])).unwrap_err();
        assert_eq!(
            errors,
            vec![DefinitionError::UnknownEntry {
                entry: "b".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicate_node() {
        let errors = validate_workflow_graph(&outline(&["a", "a"], Some("a"), &[])).unwrap_err();
        assert!(matches!(errors[0], DefinitionError::DuplicateNode { .. }));
    }

    #[test]
    fn test_undeclared_edge_target() {
        let errors =
            validate_workflow_graph(&outline(&["a"], Some("a"), &[("a", "ghost")])).unwrap_err();
        assert_eq!(
            errors,
            vec![DefinitionError::UndeclaredNode {
                from: "a".to_string(),
                missing: "ghost".to_string()
            }]
        );
    }

    #[test]
    fn test_undeclared_label_target() {
        let mut graph = outline(&["a", "b"], Some("a"), &[]);
        graph.branches.push(branch("a", &[("ok", "b"), ("bad", "nowhere")]));

        let errors = validate_workflow_graph(&graph).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            DefinitionError::UndeclaredNode { missing, .. } if missing == "nowhere"
        ));
    }

    #[test]
    fn test_undeclared_source_reported_once() {
        let mut graph = outline(&["a", "b"], Some("a"), &[("a", "b"), ("ghost", "b")]);
        graph.branches.push(branch("ghost", &[("x", "a"), ("y", "b")]));
        graph.branches.push(branch("phantom", &[]));

        let errors = validate_workflow_graph(&graph).unwrap_err();
        let undeclared: Vec<_> = errors
            .iter()
            .filter(|e| matches!(e, DefinitionError::UndeclaredNode { .. }))
            .collect();
        assert_eq!(
            undeclared,
            vec![
                &DefinitionError::UndeclaredNode {
                    from: "ghost".to_string(),
                    missing: "ghost".to_string()
                },
                &DefinitionError::UndeclaredNode {
                    from: "phantom".to_string(),
                    missing: "phantom".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_unreachable_node_is_fatal() {
        let errors =
            validate_workflow_graph(&outline(&["a", "b", "c"], Some("a"), &[("a", "b")]))
                .unwrap_err();
        assert_eq!(
            errors,
            vec![DefinitionError::UnreachableNode {
                node: "c".to_string()
            }]
        );
    }

    #[test]
    fn test_fan_out_rejected() {
        let graph = outline(&["a", "b", "c"], Some("a"), &[("a", "b"), ("a", "c")]);
        let errors = validate_workflow_graph(&graph).unwrap_err();
        assert!(matches!(&errors[0], DefinitionError::FanOut { node, .. } if node == "a"));
    }

    #[test]
    fn test_conflicting_edges_rejected() {
        let mut graph = outline(&["a", "b"], Some("a"), &[("a", "b")]);
        graph.branches.push(branch("a", &[("x", "b")]));

        let errors = validate_workflow_graph(&graph).unwrap_err();
        assert_eq!(
            errors,
            vec![DefinitionError::ConflictingEdges {
                node: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_label_map_rejected() {
        let mut graph = outline(&["a"], Some("a"), &[]);
        graph.branches.push(branch("a", &[]));

        let errors = validate_workflow_graph(&graph).unwrap_err();
        assert_eq!(
            errors,
            vec![DefinitionError::EmptyLabelMap {
                node: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_multiple_errors_accumulate() {
        let graph = outline(&["a", "a", "b"], None, &[("b", "missing")]);
        let errors = validate_workflow_graph(&graph).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
