//! Workflow repository trait

use async_trait::async_trait;
use workflow_types::{ProjectId, Workflow, WorkflowId, WorkflowResult};

/// Storage boundary for workflow aggregates
///
/// Implementations treat each write as a single unit covering the whole
/// aggregate. Concurrent edits to the same workflow are serialized by
/// the backend's isolation, not by callers of this trait.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Persist a new workflow
    ///
    /// Fails with [`WorkflowError::WorkflowExists`] if the id is taken
    /// and with [`WorkflowError::DefaultWorkflowExists`] if the default
    /// flag collides with another workflow of the same project.
    ///
    /// [`WorkflowError::WorkflowExists`]: workflow_types::WorkflowError::WorkflowExists
    /// [`WorkflowError::DefaultWorkflowExists`]: workflow_types::WorkflowError::DefaultWorkflowExists
    async fn create(&self, workflow: Workflow) -> WorkflowResult<Workflow>;

    /// Get a workflow by id
    async fn get(&self, id: &WorkflowId) -> WorkflowResult<Option<Workflow>>;

    /// List all workflows of a project
    async fn list_for_project(&self, project_id: &ProjectId) -> WorkflowResult<Vec<Workflow>>;

    /// Get the project's default workflow, if one is flagged
    async fn default_for_project(&self, project_id: &ProjectId)
        -> WorkflowResult<Option<Workflow>>;

    /// Replace a stored workflow, statuses and transitions included
    async fn update(&self, workflow: Workflow) -> WorkflowResult<Workflow>;

    /// Delete a workflow and everything it owns
    async fn delete(&self, id: &WorkflowId) -> WorkflowResult<()>;

    /// Check whether a workflow exists
    async fn exists(&self, id: &WorkflowId) -> WorkflowResult<bool>;
}
