//! Construction and update requests
//!
//! The API layer submits workflows flat: a list of status specs and a
//! list of transition specs whose endpoints name statuses by submission
//! index or, on updates, by existing id. The orchestration service
//! resolves the references, assembles the aggregate, validates it, and
//! persists it.

use crate::{StatusId, TransitionId};
use serde::{Deserialize, Serialize};

/// How a transition spec names its endpoints
///
/// On create, only indexes can resolve (ids do not exist yet). On
/// update, either form works; an index points into the submitted status
/// list, whether the entry is new or kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusRef {
    /// Position of the status in the submitted list
    Index(usize),
    /// An existing status id
    Id(StatusId),
}

impl From<usize> for StatusRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<StatusId> for StatusRef {
    fn from(id: StatusId) -> Self {
        Self::Id(id)
    }
}

// ── Create ───────────────────────────────────────────────────────────

/// One status in a create submission
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusSpec {
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub is_initial: bool,
    #[serde(default)]
    pub is_final: bool,
}

/// One transition in a create submission
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub from: StatusRef,
    pub to: StatusRef,
    pub name: String,
}

/// A full workflow submitted for creation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateWorkflowRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_default: bool,
    pub statuses: Vec<StatusSpec>,
    #[serde(default)]
    pub transitions: Vec<TransitionSpec>,
}

impl CreateWorkflowRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            is_default: false,
            statuses: Vec::new(),
            transitions: Vec::new(),
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

    pub fn with_status(
        mut self,
        name: impl Into<String>,
        position: i32,
        is_initial: bool,
        is_final: bool,
    ) -> Self {
        self.statuses.push(StatusSpec {
            name: name.into(),
            position,
            is_initial,
            is_final,
        });
        self
    }

    /// Add a transition by submitted status indexes
    pub fn with_transition(mut self, from: usize, to: usize, name: impl Into<String>) -> Self {
        self.transitions.push(TransitionSpec {
            from: StatusRef::Index(from),
            to: StatusRef::Index(to),
            name: name.into(),
        });
        self
    }
}

// ── Update ───────────────────────────────────────────────────────────

/// One status in an update submission
///
/// With an `id` the stored status is edited in place; without one a new
/// status is added. Stored statuses missing from the submission are
/// removed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StatusId>,
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub is_initial: bool,
    #[serde(default)]
    pub is_final: bool,
}

/// One transition in an update submission, same id semantics as
/// [`StatusUpdate`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TransitionId>,
    pub from: StatusRef,
    pub to: StatusRef,
    pub name: String,
}

/// A full-replace workflow update
///
/// This is a complete description of the desired workflow, not a patch:
/// whatever the submission omits is removed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateWorkflowRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_default: bool,
    pub statuses: Vec<StatusUpdate>,
    #[serde(default)]
    pub transitions: Vec<TransitionUpdate>,
}

impl UpdateWorkflowRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            is_default: false,
            statuses: Vec::new(),
            transitions: Vec::new(),
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

    /// Keep (and possibly edit) an existing status
    pub fn keep_status(
        mut self,
        id: StatusId,
        name: impl Into<String>,
        position: i32,
        is_initial: bool,
        is_final: bool,
    ) -> Self {
        self.statuses.push(StatusUpdate {
            id: Some(id),
            name: name.into(),
            position,
            is_initial,
            is_final,
        });
        self
    }

    /// Add a brand-new status
    pub fn add_status(
        mut self,
        name: impl Into<String>,
        position: i32,
        is_initial: bool,
        is_final: bool,
    ) -> Self {
        self.statuses.push(StatusUpdate {
            id: None,
            name: name.into(),
            position,
            is_initial,
            is_final,
        });
        self
    }

    /// Keep (and possibly re-point) an existing transition
    pub fn keep_transition(
        mut self,
        id: TransitionId,
        from: impl Into<StatusRef>,
        to: impl Into<StatusRef>,
        name: impl Into<String>,
    ) -> Self {
        self.transitions.push(TransitionUpdate {
            id: Some(id),
            from: from.into(),
            to: to.into(),
            name: name.into(),
        });
        self
    }

    /// Add a brand-new transition
    pub fn add_transition(
        mut self,
        from: impl Into<StatusRef>,
        to: impl Into<StatusRef>,
        name: impl Into<String>,
    ) -> Self {
        self.transitions.push(TransitionUpdate {
            id: None,
            from: from.into(),
            to: to.into(),
            name: name.into(),
        });
        self
    }
}
