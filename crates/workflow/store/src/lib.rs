//! Workflow storage boundary for Atrium
//!
//! [`WorkflowRepository`] is the seam between the workflow engine and
//! whatever persists workflows. Aggregates cross it whole: a workflow is
//! created, replaced, and deleted together with all of its statuses and
//! transitions.
//!
//! The in-memory implementation here backs development and tests.
//! Production uses the platform's SQL backend behind the same trait,
//! where "one default workflow per project" is a partial unique index;
//! [`InMemoryWorkflowRepository`] enforces the same constraint itself.

#![deny(unsafe_code)]

pub mod memory;
pub mod repository;

// Re-exports
pub use memory::InMemoryWorkflowRepository;
pub use repository::WorkflowRepository;
