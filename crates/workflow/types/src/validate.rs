//! Structural validation of workflow graphs
//!
//! The validator is the gate between editing a workflow and persisting
//! it. Checks run in a fixed order and stop at the first failure, each
//! with its own error variant so callers can report a precise reason:
//!
//! 1. at least one status
//! 2. exactly one initial status
//! 3. at least one final status
//! 4. status names are unique (and non-empty)
//! 5. every transition endpoint resolves to an owned status
//! 6. no two transitions share a `(from, to)` pair
//! 7. every final status is reachable from the initial status
//! 8. every remaining status is reachable from the initial status
//!
//! Reachability follows transitions forward from the initial status.
//! Cycles are legal; the visited set keeps the traversal finite. Pure
//! evaluation, no side effects.

use crate::{Status, StatusId, Workflow, WorkflowError, WorkflowResult};
use std::collections::{HashMap, HashSet, VecDeque};

/// Validates workflows for structural correctness
#[derive(Clone, Debug, Default)]
pub struct WorkflowValidator;

impl WorkflowValidator {
    pub fn new() -> Self {
        Self
    }

    /// Run all checks in order, stopping at the first failure
    pub fn validate(&self, workflow: &Workflow) -> WorkflowResult<()> {
        if workflow.statuses.is_empty() {
            return Err(WorkflowError::EmptyWorkflow);
        }

        let initial = self.check_single_initial(workflow)?;

        if !workflow.statuses.iter().any(|s| s.is_final) {
            return Err(WorkflowError::NoFinalStatus);
        }

        self.check_names(workflow)?;
        self.check_endpoints(workflow)?;
        self.check_transition_pairs(workflow)?;
        self.check_reachability(workflow, initial)?;
        Ok(())
    }

    fn check_single_initial<'a>(&self, workflow: &'a Workflow) -> WorkflowResult<&'a Status> {
        let initials: Vec<&Status> = workflow.statuses.iter().filter(|s| s.is_initial).collect();
        match initials.len() {
            0 => Err(WorkflowError::NoInitialStatus),
            1 => Ok(initials[0]),
            count => Err(WorkflowError::MultipleInitialStatuses { count }),
        }
    }

    fn check_names(&self, workflow: &Workflow) -> WorkflowResult<()> {
        let mut seen = HashSet::new();
        for status in &workflow.statuses {
            if status.name.trim().is_empty() {
                return Err(WorkflowError::EmptyStatusName);
            }
            if !seen.insert(status.name.as_str()) {
                return Err(WorkflowError::DuplicateStatusName(status.name.clone()));
            }
        }
        Ok(())
    }

    fn check_endpoints(&self, workflow: &Workflow) -> WorkflowResult<()> {
        for transition in &workflow.transitions {
            for endpoint in [&transition.from_status, &transition.to_status] {
                if workflow.status(endpoint).is_none() {
                    return Err(WorkflowError::DanglingTransition {
                        transition: transition.id.clone(),
                        status: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_transition_pairs(&self, workflow: &Workflow) -> WorkflowResult<()> {
        let mut seen = HashSet::new();
        for transition in &workflow.transitions {
            if !seen.insert((&transition.from_status, &transition.to_status)) {
                return Err(WorkflowError::DuplicateTransition {
                    from: transition.from_status.clone(),
                    to: transition.to_status.clone(),
                });
            }
        }
        Ok(())
    }

    /// Breadth-first traversal over the adjacency list built once from
    /// the transition set. Unreachable final statuses are reported ahead
    /// of other unreachable statuses: a workflow nobody can finish is
    /// the sharper complaint.
    fn check_reachability(&self, workflow: &Workflow, initial: &Status) -> WorkflowResult<()> {
        let mut adjacency: HashMap<StatusId, Vec<StatusId>> = HashMap::new();
        for transition in &workflow.transitions {
            adjacency
                .entry(transition.from_status.clone())
                .or_default()
                .push(transition.to_status.clone());
        }

        let mut visited: HashSet<StatusId> = HashSet::new();
        let mut queue = VecDeque::from([initial.id.clone()]);
        while let Some(current) = queue.pop_front() {
            if visited.insert(current.clone()) {
                if let Some(targets) = adjacency.get(&current) {
                    for target in targets {
                        if !visited.contains(target) {
                            queue.push_back(target.clone());
                        }
                    }
                }
            }
        }

        let unreachable_finals: Vec<StatusId> = workflow
            .statuses
            .iter()
            .filter(|s| s.is_final && !visited.contains(&s.id))
            .map(|s| s.id.clone())
            .collect();
        if !unreachable_finals.is_empty() {
            return Err(WorkflowError::UnreachableFinalStatuses {
                ids: unreachable_finals,
            });
        }

        let unreachable: Vec<StatusId> = workflow
            .statuses
            .iter()
            .filter(|s| !visited.contains(&s.id))
            .map(|s| s.id.clone())
            .collect();
        if !unreachable.is_empty() {
            return Err(WorkflowError::UnreachableStatuses { ids: unreachable });
        }

        Ok(())
    }
}
