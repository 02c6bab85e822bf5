//! Error types for workflow operations
//!
//! One enum covers the whole taxonomy. Every variant is recoverable by the
//! caller: fix the request and resubmit. `code()` gives the stable
//! machine-readable string the API layer puts in error payloads.

use crate::{ProjectId, StatusId, TransitionId, WorkflowId};
use thiserror::Error;

/// Errors raised by workflow construction, validation, and orchestration
#[derive(Debug, Error)]
pub enum WorkflowError {
    // ── Validation ───────────────────────────────────────────────────

    #[error("Workflow has no statuses")]
    EmptyWorkflow,

    #[error("Workflow has no initial status")]
    NoInitialStatus,

    #[error("Workflow has {count} initial statuses, expected exactly one")]
    MultipleInitialStatuses { count: usize },

    #[error("Workflow has no final status")]
    NoFinalStatus,

    #[error("Workflow name cannot be empty")]
    EmptyWorkflowName,

    #[error("Status name cannot be empty")]
    EmptyStatusName,

    #[error("Duplicate status name: {0}")]
    DuplicateStatusName(String),

    #[error("Status not found: {0}")]
    UnknownStatus(StatusId),

    #[error("Transition not found: {0}")]
    UnknownTransition(TransitionId),

    #[error("Duplicate transition from {from} to {to}")]
    DuplicateTransition { from: StatusId, to: StatusId },

    #[error("Status {status} is still referenced by {} transition(s)", .transitions.len())]
    StatusInUse {
        status: StatusId,
        transitions: Vec<TransitionId>,
    },

    #[error("Transition {transition} references missing status {status}")]
    DanglingTransition {
        transition: TransitionId,
        status: StatusId,
    },

    #[error("Workflow has {} status(es) unreachable from the initial status", .ids.len())]
    UnreachableStatuses { ids: Vec<StatusId> },

    #[error("Workflow has {} final status(es) unreachable from the initial status", .ids.len())]
    UnreachableFinalStatuses { ids: Vec<StatusId> },

    #[error("Transition references status index {index}, but {len} statuses were submitted")]
    InvalidStatusRef { index: usize, len: usize },

    // ── Not found ────────────────────────────────────────────────────

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(WorkflowId),

    #[error("Project {0} has no default workflow")]
    NoDefaultWorkflow(ProjectId),

    // ── Conflict ─────────────────────────────────────────────────────

    #[error("Workflow already exists: {0}")]
    WorkflowExists(WorkflowId),

    #[error("Project {project} already has a default workflow: {existing}")]
    DefaultWorkflowExists {
        project: ProjectId,
        existing: WorkflowId,
    },
}

impl WorkflowError {
    /// Stable machine-readable code for API error payloads
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyWorkflow => "empty_workflow",
            Self::NoInitialStatus => "no_initial_status",
            Self::MultipleInitialStatuses { .. } => "multiple_initial_statuses",
            Self::NoFinalStatus => "no_final_status",
            Self::EmptyWorkflowName => "empty_workflow_name",
            Self::EmptyStatusName => "empty_status_name",
            Self::DuplicateStatusName(_) => "duplicate_status_name",
            Self::UnknownStatus(_) => "unknown_status",
            Self::UnknownTransition(_) => "unknown_transition",
            Self::DuplicateTransition { .. } => "duplicate_transition",
            Self::StatusInUse { .. } => "status_in_use",
            Self::DanglingTransition { .. } => "dangling_transition",
            Self::UnreachableStatuses { .. } => "unreachable_statuses",
            Self::UnreachableFinalStatuses { .. } => "unreachable_final_statuses",
            Self::InvalidStatusRef { .. } => "invalid_status_ref",
            Self::WorkflowNotFound(_) => "workflow_not_found",
            Self::NoDefaultWorkflow(_) => "no_default_workflow",
            Self::WorkflowExists(_) => "workflow_exists",
            Self::DefaultWorkflowExists { .. } => "default_workflow_exists",
        }
    }

    /// The caller sent a structurally invalid workflow or request
    pub fn is_validation(&self) -> bool {
        !self.is_not_found() && !self.is_conflict()
    }

    /// The referenced entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::WorkflowNotFound(_) | Self::NoDefaultWorkflow(_))
    }

    /// The write collides with existing state
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::WorkflowExists(_) | Self::DefaultWorkflowExists { .. }
        )
    }
}

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
