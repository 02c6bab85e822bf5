//! Transitions: the directed edges of a workflow's state graph

use crate::{StatusId, TransitionId, WorkflowId};
use serde::{Deserialize, Serialize};

/// A directed move between two statuses of the same workflow
///
/// A transition permits `from_status` to `to_status` only. The reverse
/// move needs its own transition. Self-loops are allowed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transition {
    /// Unique identifier
    pub id: TransitionId,
    /// The workflow this transition belongs to
    pub workflow_id: WorkflowId,
    /// Source status
    pub from_status: StatusId,
    /// Target status
    pub to_status: StatusId,
    /// Action label shown to users, e.g. "Start Progress"
    pub name: String,
}

impl Transition {
    pub fn new(
        workflow_id: WorkflowId,
        from_status: StatusId,
        to_status: StatusId,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: TransitionId::generate(),
            workflow_id,
            from_status,
            to_status,
            name: name.into(),
        }
    }

    /// Whether this transition connects the given pair, in that direction
    pub fn connects(&self, from: &StatusId, to: &StatusId) -> bool {
        &self.from_status == from && &self.to_status == to
    }

    /// Whether this transition starts and ends at the same status
    pub fn is_self_loop(&self) -> bool {
        self.from_status == self.to_status
    }

    /// Whether this transition touches the given status at either end
    pub fn references(&self, status: &StatusId) -> bool {
        &self.from_status == status || &self.to_status == status
    }
}
