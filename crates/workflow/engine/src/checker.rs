//! Transition legality checks
//!
//! Answers whether moving an issue directly from one status to another
//! is permitted by a workflow. Only direct edges count: reachability
//! through intermediate statuses never makes a move legal. Pure lookup,
//! no side effects.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use workflow_types::{StatusId, Workflow};

/// Checks direct transition legality against one workflow
///
/// The edge set is built once at construction, so per-move checks are
/// constant time regardless of workflow size.
#[derive(Clone, Debug)]
pub struct TransitionChecker<'a> {
    workflow: &'a Workflow,
    edges: HashSet<(StatusId, StatusId)>,
}

impl<'a> TransitionChecker<'a> {
    pub fn new(workflow: &'a Workflow) -> Self {
        let edges = workflow
            .transitions
            .iter()
            .map(|t| (t.from_status.clone(), t.to_status.clone()))
            .collect();
        Self { workflow, edges }
    }

    /// True iff a transition with exactly this `(from, to)` pair exists
    ///
    /// With only To Do -> In Progress -> Done defined, To Do -> Done is
    /// not legal. Unknown status ids are simply not legal.
    pub fn is_legal(&self, from: &StatusId, to: &StatusId) -> bool {
        self.edges.contains(&(from.clone(), to.clone()))
    }

    /// Check a move and explain a denial
    ///
    /// Never errors: a move a workflow cannot express, unknown ids
    /// included, is a denial with a message rather than a failure.
    pub fn check(&self, from: &StatusId, to: &StatusId) -> TransitionCheck {
        if self.is_legal(from, to) {
            return TransitionCheck::allowed();
        }
        TransitionCheck::denied(format!(
            "No transition from '{}' to '{}' in workflow '{}'",
            self.status_label(from),
            self.status_label(to),
            self.workflow.name
        ))
    }

    fn status_label(&self, id: &StatusId) -> String {
        match self.workflow.status(id) {
            Some(status) => status.name.clone(),
            None => format!("unknown status {}", id),
        }
    }
}

/// Outcome of a transition legality check
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionCheck {
    /// Whether the move is permitted
    pub allowed: bool,
    /// Denial explanation; absent when allowed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TransitionCheck {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            message: None,
        }
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            message: Some(message.into()),
        }
    }
}
