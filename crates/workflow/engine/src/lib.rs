//! Workflow engine for the Atrium issue tracking platform
//!
//! The engine sits between the API layer and storage. It owns the two
//! pieces of workflow behavior that are not pure data:
//!
//! - [`WorkflowService`] — assembles workflows out of flat API
//!   submissions, validates them, enforces the one-default-per-project
//!   policy, and drives the repository
//! - [`TransitionChecker`] — answers "may an issue move from status A
//!   to status B" against a single workflow's transition set
//!
//! Structural rules (exactly one initial status, reachability, and so
//! on) live with the aggregate in `workflow-types`; the engine invokes
//! them before anything is persisted.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use workflow_engine::WorkflowService;
//! use workflow_store::InMemoryWorkflowRepository;
//! use workflow_types::{CreateWorkflowRequest, ProjectId};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = WorkflowService::new(Arc::new(InMemoryWorkflowRepository::new()));
//!
//! let request = CreateWorkflowRequest::new("Bug Flow")
//!     .with_status("To Do", 0, true, false)
//!     .with_status("Done", 1, false, true)
//!     .with_transition(0, 1, "Finish");
//!
//! let workflow = service.create_workflow(ProjectId::generate(), request).await?;
//!
//! let todo = workflow.status_by_name("To Do").unwrap().id.clone();
//! let done = workflow.status_by_name("Done").unwrap().id.clone();
//! let check = service.check_transition(&workflow.id, &todo, &done).await?;
//! assert!(check.allowed);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod checker;
pub mod service;

pub use checker::{TransitionCheck, TransitionChecker};
pub use service::{DefaultPolicy, WorkflowService};
