//! Statuses: the nodes of a workflow's state graph

use crate::{StatusId, WorkflowId};
use serde::{Deserialize, Serialize};

/// A status an issue can occupy within one workflow
///
/// Names are unique within the owning workflow and case-sensitive.
/// `position` orders statuses on boards and in pickers; it carries no
/// transition semantics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Status {
    /// Unique identifier
    pub id: StatusId,
    /// The workflow this status belongs to
    pub workflow_id: WorkflowId,
    /// Display name, unique within the workflow
    pub name: String,
    /// Display ordering hint
    pub position: i32,
    /// Whether issues enter the workflow here
    pub is_initial: bool,
    /// Whether reaching this status closes the issue
    pub is_final: bool,
}

impl Status {
    /// Create a new status with neither flag set
    pub fn new(workflow_id: WorkflowId, name: impl Into<String>, position: i32) -> Self {
        Self {
            id: StatusId::generate(),
            workflow_id,
            name: name.into(),
            position,
            is_initial: false,
            is_final: false,
        }
    }

    pub fn with_initial(mut self, is_initial: bool) -> Self {
        self.is_initial = is_initial;
        self
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }
}
