//! In-memory implementation of the workflow repository
//!
//! Suitable for development and testing. Production deployments use a
//! persistent backend behind the same trait.

use crate::repository::WorkflowRepository;
use async_trait::async_trait;
use dashmap::DashMap;
use workflow_types::{ProjectId, Workflow, WorkflowError, WorkflowId, WorkflowResult};

/// In-memory workflow repository
///
/// Keeps whole aggregates keyed by id, plus a project index for listing.
/// Enforces the storage-layer rule that at most one workflow per project
/// carries the default flag.
pub struct InMemoryWorkflowRepository {
    workflows: DashMap<WorkflowId, Workflow>,
    by_project: DashMap<ProjectId, Vec<WorkflowId>>,
}

impl InMemoryWorkflowRepository {
    pub fn new() -> Self {
        Self {
            workflows: DashMap::new(),
            by_project: DashMap::new(),
        }
    }

    /// Another workflow of the same project already flagged default
    fn default_conflict(&self, workflow: &Workflow) -> Option<WorkflowId> {
        if !workflow.is_default {
            return None;
        }
        let ids = self.by_project.get(&workflow.project_id)?;
        for id in ids.iter() {
            if id == &workflow.id {
                continue;
            }
            if let Some(existing) = self.workflows.get(id) {
                if existing.is_default {
                    return Some(id.clone());
                }
            }
        }
        None
    }
}

impl Default for InMemoryWorkflowRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn create(&self, workflow: Workflow) -> WorkflowResult<Workflow> {
        if self.workflows.contains_key(&workflow.id) {
            return Err(WorkflowError::WorkflowExists(workflow.id.clone()));
        }
        if let Some(existing) = self.default_conflict(&workflow) {
            return Err(WorkflowError::DefaultWorkflowExists {
                project: workflow.project_id.clone(),
                existing,
            });
        }

        self.workflows
            .insert(workflow.id.clone(), workflow.clone());

        // Index by project
        self.by_project
            .entry(workflow.project_id.clone())
            .or_default()
            .push(workflow.id.clone());

        Ok(workflow)
    }

    async fn get(&self, id: &WorkflowId) -> WorkflowResult<Option<Workflow>> {
        Ok(self.workflows.get(id).map(|w| w.clone()))
    }

    async fn list_for_project(&self, project_id: &ProjectId) -> WorkflowResult<Vec<Workflow>> {
        let mut result = Vec::new();
        if let Some(ids) = self.by_project.get(project_id) {
            for id in ids.iter() {
                if let Some(workflow) = self.workflows.get(id) {
                    result.push(workflow.clone());
                }
            }
        }
        Ok(result)
    }

    async fn default_for_project(
        &self,
        project_id: &ProjectId,
    ) -> WorkflowResult<Option<Workflow>> {
        if let Some(ids) = self.by_project.get(project_id) {
            for id in ids.iter() {
                if let Some(workflow) = self.workflows.get(id) {
                    if workflow.is_default {
                        return Ok(Some(workflow.clone()));
                    }
                }
            }
        }
        Ok(None)
    }

    async fn update(&self, workflow: Workflow) -> WorkflowResult<Workflow> {
        let previous_project = match self.workflows.get(&workflow.id) {
            Some(stored) => stored.project_id.clone(),
            None => return Err(WorkflowError::WorkflowNotFound(workflow.id.clone())),
        };
        if let Some(existing) = self.default_conflict(&workflow) {
            return Err(WorkflowError::DefaultWorkflowExists {
                project: workflow.project_id.clone(),
                existing,
            });
        }

        // Keep the project index consistent if the aggregate moved
        if previous_project != workflow.project_id {
            if let Some(mut ids) = self.by_project.get_mut(&previous_project) {
                ids.retain(|i| i != &workflow.id);
            }
            self.by_project
                .entry(workflow.project_id.clone())
                .or_default()
                .push(workflow.id.clone());
        }

        self.workflows
            .insert(workflow.id.clone(), workflow.clone());
        Ok(workflow)
    }

    async fn delete(&self, id: &WorkflowId) -> WorkflowResult<()> {
        let (_, workflow) = self
            .workflows
            .remove(id)
            .ok_or_else(|| WorkflowError::WorkflowNotFound(id.clone()))?;

        // Clean up the project index
        if let Some(mut ids) = self.by_project.get_mut(&workflow.project_id) {
            ids.retain(|i| i != id);
        }

        Ok(())
    }

    async fn exists(&self, id: &WorkflowId) -> WorkflowResult<bool> {
        Ok(self.workflows.contains_key(id))
    }
}
