//! The workflow aggregate: a project-scoped state graph
//!
//! A Workflow exclusively owns its statuses and transitions; nothing is
//! shared across workflows, and the whole aggregate is persisted and
//! deleted as one unit. Mutators keep local rules (non-empty names, known
//! endpoints) but deliberately allow transiently broken graphs, so callers
//! can rearrange statuses freely. [`Workflow::validate`] is the gate that
//! must pass before the aggregate is handed to storage.

use crate::{
    ProjectId, Status, StatusId, Transition, TransitionId, WorkflowError, WorkflowId,
    WorkflowResult, WorkflowValidator,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project's workflow: statuses, transitions, and metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique identifier
    pub id: WorkflowId,
    /// The project this workflow belongs to
    pub project_id: ProjectId,
    /// Human-readable name
    pub name: String,
    /// Description of what this workflow is for
    #[serde(default)]
    pub description: String,
    /// Whether this is the project's default workflow
    pub is_default: bool,
    /// The statuses issues can occupy
    pub statuses: Vec<Status>,
    /// The legal moves between statuses
    pub transitions: Vec<Transition>,
    /// When this workflow was created
    pub created_at: DateTime<Utc>,
    /// When this workflow was last modified
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Create a new empty workflow
    pub fn new(name: impl Into<String>, project_id: ProjectId) -> Self {
        let now = Utc::now();
        Self {
            id: WorkflowId::generate(),
            project_id,
            name: name.into(),
            description: String::new(),
            is_default: false,
            statuses: Vec::new(),
            transitions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    // ── Mutators ─────────────────────────────────────────────────────

    /// Add a status to the workflow
    ///
    /// Rejects blank and duplicate names immediately. A second
    /// `is_initial` flag is allowed here and caught by [`validate`]
    /// instead, so flags can be moved between statuses in any order.
    ///
    /// [`validate`]: Workflow::validate
    pub fn add_status(
        &mut self,
        name: impl Into<String>,
        position: i32,
        is_initial: bool,
        is_final: bool,
    ) -> WorkflowResult<Status> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(WorkflowError::EmptyStatusName);
        }
        if self.statuses.iter().any(|s| s.name == name) {
            return Err(WorkflowError::DuplicateStatusName(name));
        }

        let status = Status::new(self.id.clone(), name, position)
            .with_initial(is_initial)
            .with_final(is_final);
        self.statuses.push(status.clone());
        self.touch();
        Ok(status)
    }

    /// Edit a status in place
    ///
    /// Rejects a blank name. Duplicate names are deferred to
    /// [`Workflow::validate`] so that full-replace updates can reorder
    /// names freely.
    pub fn update_status(
        &mut self,
        id: &StatusId,
        name: impl Into<String>,
        position: i32,
        is_initial: bool,
        is_final: bool,
    ) -> WorkflowResult<Status> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(WorkflowError::EmptyStatusName);
        }

        let status = self
            .statuses
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| WorkflowError::UnknownStatus(id.clone()))?;
        status.name = name;
        status.position = position;
        status.is_initial = is_initial;
        status.is_final = is_final;
        let updated = status.clone();
        self.touch();
        Ok(updated)
    }

    /// Remove a status
    ///
    /// Fails with [`WorkflowError::StatusInUse`] while any transition
    /// still references the status; remove those transitions first.
    pub fn remove_status(&mut self, id: &StatusId) -> WorkflowResult<Status> {
        let index = self
            .statuses
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| WorkflowError::UnknownStatus(id.clone()))?;

        let dependents: Vec<TransitionId> = self
            .transitions
            .iter()
            .filter(|t| t.references(id))
            .map(|t| t.id.clone())
            .collect();
        if !dependents.is_empty() {
            return Err(WorkflowError::StatusInUse {
                status: id.clone(),
                transitions: dependents,
            });
        }

        let status = self.statuses.remove(index);
        self.touch();
        Ok(status)
    }

    /// Add a transition between two owned statuses
    ///
    /// Both endpoints must already exist in this workflow. An exact
    /// duplicate `(from, to)` pair is rejected; self-loops are fine.
    pub fn add_transition(
        &mut self,
        from: &StatusId,
        to: &StatusId,
        name: impl Into<String>,
    ) -> WorkflowResult<Transition> {
        if self.status(from).is_none() {
            return Err(WorkflowError::UnknownStatus(from.clone()));
        }
        if self.status(to).is_none() {
            return Err(WorkflowError::UnknownStatus(to.clone()));
        }
        if self.transitions.iter().any(|t| t.connects(from, to)) {
            return Err(WorkflowError::DuplicateTransition {
                from: from.clone(),
                to: to.clone(),
            });
        }

        let transition = Transition::new(self.id.clone(), from.clone(), to.clone(), name);
        self.transitions.push(transition.clone());
        self.touch();
        Ok(transition)
    }

    /// Edit a transition in place, with the same endpoint rules as
    /// [`Workflow::add_transition`]
    pub fn update_transition(
        &mut self,
        id: &TransitionId,
        from: &StatusId,
        to: &StatusId,
        name: impl Into<String>,
    ) -> WorkflowResult<Transition> {
        if self.status(from).is_none() {
            return Err(WorkflowError::UnknownStatus(from.clone()));
        }
        if self.status(to).is_none() {
            return Err(WorkflowError::UnknownStatus(to.clone()));
        }
        if self
            .transitions
            .iter()
            .any(|t| &t.id != id && t.connects(from, to))
        {
            return Err(WorkflowError::DuplicateTransition {
                from: from.clone(),
                to: to.clone(),
            });
        }

        let transition = self
            .transitions
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| WorkflowError::UnknownTransition(id.clone()))?;
        transition.from_status = from.clone();
        transition.to_status = to.clone();
        transition.name = name.into();
        let updated = transition.clone();
        self.touch();
        Ok(updated)
    }

    /// Replace the whole status and transition sets at once
    ///
    /// For full-replace edits assembled outside the aggregate. No
    /// per-entry checks run here; [`Workflow::validate`] is the gate for
    /// the result, exactly as for aggregates arriving through serde.
    pub fn replace_graph(&mut self, statuses: Vec<Status>, transitions: Vec<Transition>) {
        self.statuses = statuses;
        self.transitions = transitions;
        self.touch();
    }

    /// Remove a transition
    pub fn remove_transition(&mut self, id: &TransitionId) -> WorkflowResult<Transition> {
        let index = self
            .transitions
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| WorkflowError::UnknownTransition(id.clone()))?;
        let transition = self.transitions.remove(index);
        self.touch();
        Ok(transition)
    }

    /// Rename the workflow
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Replace the description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    /// Set or clear the default flag
    ///
    /// Project-wide uniqueness of the flag is the storage layer's rule;
    /// the aggregate only carries it.
    pub fn set_default(&mut self, is_default: bool) {
        self.is_default = is_default;
        self.touch();
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Get a status by id
    pub fn status(&self, id: &StatusId) -> Option<&Status> {
        self.statuses.iter().find(|s| &s.id == id)
    }

    /// Get a status by its exact name
    pub fn status_by_name(&self, name: &str) -> Option<&Status> {
        self.statuses.iter().find(|s| s.name == name)
    }

    /// The status issues enter the workflow at, if exactly flagged
    pub fn initial_status(&self) -> Option<&Status> {
        self.statuses.iter().find(|s| s.is_initial)
    }

    /// All statuses that close an issue
    pub fn final_statuses(&self) -> Vec<&Status> {
        self.statuses.iter().filter(|s| s.is_final).collect()
    }

    /// Statuses in display order: by position, then name for ties
    pub fn statuses_by_position(&self) -> Vec<&Status> {
        let mut ordered: Vec<&Status> = self.statuses.iter().collect();
        ordered.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
        ordered
    }

    /// Get a transition by id
    pub fn transition(&self, id: &TransitionId) -> Option<&Transition> {
        self.transitions.iter().find(|t| &t.id == id)
    }

    /// The transition connecting a pair of statuses, if any
    pub fn transition_between(&self, from: &StatusId, to: &StatusId) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.connects(from, to))
    }

    /// Transitions leaving a status
    pub fn outgoing(&self, status: &StatusId) -> Vec<&Transition> {
        self.transitions
            .iter()
            .filter(|t| &t.from_status == status)
            .collect()
    }

    /// Transitions arriving at a status
    pub fn incoming(&self, status: &StatusId) -> Vec<&Transition> {
        self.transitions
            .iter()
            .filter(|t| &t.to_status == status)
            .collect()
    }

    /// Total number of statuses
    pub fn status_count(&self) -> usize {
        self.statuses.len()
    }

    /// Total number of transitions
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Run the full set of structural checks
    ///
    /// Idempotent: validating an unmodified workflow twice gives the same
    /// answer and has no side effects.
    pub fn validate(&self) -> WorkflowResult<()> {
        WorkflowValidator::new().validate(self)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
