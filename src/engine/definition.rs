// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::checkpoint::InMemoryCheckpointStore;
use crate::config::{validate_workflow_graph, GraphOutline};
use crate::engine::compiled::{Next, Plan, Target};
use crate::engine::{CompiledWorkflow, WorkflowState, END};
use crate::errors::DefinitionError;
use crate::observability::messages::validation::{DefinitionRejected, WorkflowCompiled};
use crate::observability::messages::StructuredLog;
use crate::traits::{CheckpointStore, Node, Router};

struct Branch<S> {
    from: String,
    router: Router<S>,
    labels: Vec<(String, String)>,
}

/// Mutable builder for a workflow graph.
///
/// Registration never fails; every structural problem is reported together by
/// [`compile`](Self::compile). A definition can be compiled any number of times and each
/// compiled workflow is independent of later changes to the definition.
pub struct WorkflowDefinition<S> {
    name: String,
    nodes: Vec<(String, Arc<dyn Node<S>>)>,
    edges: Vec<(String, String)>,
    branches: Vec<Branch<S>>,
    entry: Option<String>,
}

impl<S: WorkflowState> WorkflowDefinition<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            branches: Vec::new(),
            entry: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register_node(&mut self, name: impl Into<String>, node: impl Node<S> + 'static) -> &mut Self {
        let node: Arc<dyn Node<S>> = Arc::new(node);
        self.nodes.push((name.into(), node));
        self
    }

    /// Unconditional transition. `to` may be [`END`].
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Route from `from` by calling `router` on the state and looking the label up in
    /// `labels`.
    pub fn add_conditional_edge<R, I, L, T>(&mut self, from: impl Into<String>, router: R, labels: I) -> &mut Self
    where
        R: Fn(&S) -> String + Send + Sync + 'static,
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
        T: Into<String>,
    {
        self.branches.push(Branch {
            from: from.into(),
            router: Arc::new(router),
            labels: labels
                .into_iter()
                .map(|(label, target)| (label.into(), target.into()))
                .collect(),
        });
        self
    }

    pub fn set_entry(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry = Some(name.into());
        self
    }

    /// The graph shape, stripped of node bodies and routers.
    pub fn outline(&self) -> GraphOutline {
        GraphOutline {
            nodes: self.nodes.iter().map(|(name, _)| name.clone()).collect(),
            entry: self.entry.clone(),
            edges: self.edges.clone(),
            branches: self
                .branches
                .iter()
                .map(|branch| (branch.from.clone(), branch.labels.clone()))
                .collect(),
        }
    }

    /// Validate and compile against a fresh in-memory checkpoint store.
    pub fn compile(&self) -> Result<CompiledWorkflow<S>, Vec<DefinitionError>> {
        self.compile_with_checkpointer(Arc::new(InMemoryCheckpointStore::<S>::new()))
    }

    /// Validate and compile against `checkpointer`.
    ///
    /// # Returns
    ///
    /// * `Ok(CompiledWorkflow)` - the graph is well formed
    /// * `Err(Vec<DefinitionError>)` - every structural problem found
    pub fn compile_with_checkpointer(
        &self,
        checkpointer: Arc<dyn CheckpointStore<S>>,
    ) -> Result<CompiledWorkflow<S>, Vec<DefinitionError>> {
        if let Err(errors) = validate_workflow_graph(&self.outline()) {
            DefinitionRejected {
                workflow: &self.name,
                errors: &errors,
            }
            .log();
            return Err(errors);
        }

        let plan = self.plan().map_err(|errors| {
            DefinitionRejected {
                workflow: &self.name,
                errors: &errors,
            }
            .log();
            errors
        })?;

        WorkflowCompiled {
            workflow: &self.name,
            node_count: plan.names.len(),
            entry: &plan.names[plan.entry],
        }
        .log();

        Ok(CompiledWorkflow::new(plan, checkpointer))
    }

    /// Resolve every name to an index. Only called on a validated outline, so a failed
    /// lookup here means validation and planning disagree.
    fn plan(&self) -> Result<Plan<S>, Vec<DefinitionError>> {
        let index: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.as_str(), i))
            .collect();

        let resolve = |from: &str, to: &str| -> Result<Target, Vec<DefinitionError>> {
            if to == END {
                return Ok(Target::End);
            }
            index.get(to).map(|&i| Target::Node(i)).ok_or_else(|| {
                vec![DefinitionError::UndeclaredNode {
                    from: from.to_string(),
                    missing: to.to_string(),
                }]
            })
        };

        let mut next: Vec<Next<S>> = self.nodes.iter().map(|_| Next::Terminal).collect();

        for (from, to) in &self.edges {
            let target = resolve(from, to)?;
            if let Some(&i) = index.get(from.as_str()) {
                next[i] = Next::Direct(target);
            }
        }

        for branch in &self.branches {
            let mut labels = HashMap::with_capacity(branch.labels.len());
            for (label, to) in &branch.labels {
                labels.insert(label.clone(), resolve(&branch.from, to)?);
            }
            if let Some(&i) = index.get(branch.from.as_str()) {
                next[i] = Next::Conditional {
                    router: Arc::clone(&branch.router),
                    labels,
                };
            }
        }

        let entry = self
            .entry
            .as_deref()
            .and_then(|entry| index.get(entry).copied())
            .ok_or_else(|| vec![DefinitionError::MissingEntry])?;

        Ok(Plan {
            name: self.name.clone(),
            entry,
            names: self.nodes.iter().map(|(name, _)| name.clone()).collect(),
            nodes: self.nodes.iter().map(|(_, node)| Arc::clone(node)).collect(),
            next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::node_fn;

    #[derive(Debug, Clone, Default)]
    struct TraceState {
        trace: Vec<String>,
    }

    impl WorkflowState for TraceState {
        fn record_visit(&mut self, node: &str) {
            self.trace.push(node.to_string());
        }

        fn trace(&self) -> &[String] {
            &self.trace
        }
    }

    fn passthrough() -> impl Node<TraceState> {
        node_fn(|state: TraceState| async move { Ok(state) })
    }

    #[test]
    fn test_outline_reflects_registration() {
        let mut definition = WorkflowDefinition::<TraceState>::new("outline");
        definition
            .register_node("a", passthrough())
            .register_node("b", passthrough())
            .add_edge("a", "b")
            .add_conditional_edge("b", |_: &TraceState| "done".to_string(), [("done", END)])
            .set_entry("a");

        let outline = definition.outline();
        assert_eq!(outline.nodes, vec!["a", "b"]);
        assert_eq!(outline.entry.as_deref(), Some("a"));
        assert_eq!(outline.edges, vec![("a".to_string(), "b".to_string())]);
        assert_eq!(
            outline.branches,
            vec![("b".to_string(), vec![("done".to_string(), END.to_string())])]
        );
    }

    #[test]
    fn test_compile_rejects_unreachable_node() {
        let mut definition = WorkflowDefinition::<TraceState>::new("orphaned");
        definition
            .register_node("a", passthrough())
            .register_node("orphan", passthrough())
            .set_entry("a");

        let errors = definition.compile().unwrap_err();
        assert_eq!(
            errors,
            vec![DefinitionError::UnreachableNode {
                node: "orphan".to_string()
            }]
        );
    }

    #[test]
    fn test_compile_reports_all_problems() {
        let mut definition = WorkflowDefinition::<TraceState>::new("broken");
        definition
            .register_node("a", passthrough())
            .register_node("a", passthrough())
            .add_edge("a", "ghost");

        let errors = definition.compile().unwrap_err();
        assert!(errors.contains(&DefinitionError::MissingEntry));
        assert!(errors.contains(&DefinitionError::DuplicateNode {
            node: "a".to_string()
        }));
        assert!(errors.contains(&DefinitionError::UndeclaredNode {
            from: "a".to_string(),
            missing: "ghost".to_string()
        }));
    }

    #[tokio::test]
    async fn test_compiling_twice_gives_equivalent_workflows() {
        let mut definition = WorkflowDefinition::<TraceState>::new("twice");
        definition
            .register_node("a", passthrough())
            .register_node("b", passthrough())
            .add_edge("a", "b")
            .set_entry("a");

        let first = definition.compile().unwrap();
        let second = definition.compile().unwrap();

        assert_eq!(first.node_names(), second.node_names());
        assert_eq!(first.entry(), second.entry());

        let a = first.invoke(TraceState::default(), "t", 10).await.unwrap();
        let b = second.invoke(TraceState::default(), "t", 10).await.unwrap();
        assert_eq!(a.state.trace, b.state.trace);
        assert_eq!(a.terminal_reason, b.terminal_reason);
    }

    #[tokio::test]
    async fn test_later_changes_do_not_affect_compiled_workflow() {
        let mut definition = WorkflowDefinition::<TraceState>::new("frozen");
        definition.register_node("a", passthrough()).set_entry("a");
        let compiled = definition.compile().unwrap();

        definition.register_node("b", passthrough()).add_edge("a", "b");

        let result = compiled.invoke(TraceState::default(), "t", 10).await.unwrap();
        assert_eq!(result.state.trace, vec!["a"]);
    }
}
