//! Workflow domain types for Atrium
//!
//! A workflow is the state machine that governs which statuses an issue
//! can occupy within a project and which moves between them are legal:
//!
//! - **Status**: a node in the graph (To Do, In Progress, Done, ...)
//! - **Transition**: a directed edge between two statuses
//! - **Workflow**: the aggregate that owns both, scoped to a project
//!
//! Workflows are permissively mutable while being edited and explicitly
//! validated before persistence. [`Workflow::validate`] runs the full set
//! of structural checks: a single initial status, at least one final
//! status, unique names, intact transition endpoints, and reachability of
//! every status from the initial one.

#![deny(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod request;
pub mod status;
pub mod transition;
pub mod validate;
pub mod workflow;

// Re-exports
pub use errors::{WorkflowError, WorkflowResult};
pub use ids::{ProjectId, StatusId, TransitionId, WorkflowId};
pub use request::{
    CreateWorkflowRequest, StatusRef, StatusSpec, StatusUpdate, TransitionSpec, TransitionUpdate,
    UpdateWorkflowRequest,
};
pub use status::Status;
pub use transition::Transition;
pub use validate::WorkflowValidator;
pub use workflow::Workflow;
