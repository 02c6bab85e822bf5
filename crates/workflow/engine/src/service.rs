//! Workflow orchestration service
//!
//! The service is the use-case boundary of the workflow engine: it
//! assembles aggregates from flat API submissions, resolves status
//! references, enforces the project default policy, validates, and only
//! then touches the repository. A validation failure aborts the whole
//! operation before anything is persisted.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use workflow_store::WorkflowRepository;
use workflow_types::{
    CreateWorkflowRequest, ProjectId, Status, StatusId, StatusRef, Transition,
    UpdateWorkflowRequest, Workflow, WorkflowError, WorkflowId, WorkflowResult,
};

use crate::checker::{TransitionCheck, TransitionChecker};

/// How a write resolves a default-flag collision within a project
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    /// Refuse the write and surface the conflict to the caller
    #[default]
    Reject,
    /// Un-flag the previous default, then persist the new one
    Reassign,
}

/// Orchestrates workflow assembly, validation, and persistence
pub struct WorkflowService {
    repository: Arc<dyn WorkflowRepository>,
    default_policy: DefaultPolicy,
}

impl WorkflowService {
    pub fn new(repository: Arc<dyn WorkflowRepository>) -> Self {
        Self {
            repository,
            default_policy: DefaultPolicy::default(),
        }
    }

    pub fn with_default_policy(mut self, policy: DefaultPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Create a workflow from a flat submission
    ///
    /// Statuses are created in submission order; transition endpoints
    /// refer to them by index. The aggregate is validated before the
    /// repository sees it.
    pub async fn create_workflow(
        &self,
        project_id: ProjectId,
        request: CreateWorkflowRequest,
    ) -> WorkflowResult<Workflow> {
        if request.name.trim().is_empty() {
            return Err(WorkflowError::EmptyWorkflowName);
        }

        let mut workflow = Workflow::new(request.name, project_id)
            .with_description(request.description)
            .with_default(request.is_default);

        for spec in &request.statuses {
            workflow.add_status(&spec.name, spec.position, spec.is_initial, spec.is_final)?;
        }

        for spec in &request.transitions {
            let from = resolve_status_ref(&spec.from, &workflow.statuses)?;
            let to = resolve_status_ref(&spec.to, &workflow.statuses)?;
            workflow.add_transition(&from, &to, &spec.name)?;
        }

        workflow.validate()?;
        self.enforce_default_policy(&workflow).await?;

        let stored = self.repository.create(workflow).await?;
        tracing::info!(
            workflow_id = %stored.id,
            project_id = %stored.project_id,
            statuses = stored.status_count(),
            transitions = stored.transition_count(),
            "Workflow created"
        );
        Ok(stored)
    }

    /// Replace a workflow with a full submission
    ///
    /// Not a patch: entries with an id carry the stored status or
    /// transition forward with the submitted edits applied, entries
    /// without one are added, and stored entries absent from the
    /// submission are removed. The replacement sets are assembled first
    /// and swapped in wholesale, so a submission is judged only by the
    /// aggregate it describes: dropping a status and reusing its name,
    /// or swapping the endpoints of two kept transitions, work in one
    /// pass.
    pub async fn update_workflow(
        &self,
        workflow_id: &WorkflowId,
        request: UpdateWorkflowRequest,
    ) -> WorkflowResult<Workflow> {
        if request.name.trim().is_empty() {
            return Err(WorkflowError::EmptyWorkflowName);
        }

        let mut workflow = self
            .repository
            .get(workflow_id)
            .await?
            .ok_or_else(|| WorkflowError::WorkflowNotFound(workflow_id.clone()))?;

        workflow.rename(request.name.clone());
        workflow.set_description(request.description.clone());
        workflow.set_default(request.is_default);

        // Statuses in submission order; Index references point into this
        // list. Kept entries start from their stored values.
        let mut statuses: Vec<Status> = Vec::with_capacity(request.statuses.len());
        for entry in &request.statuses {
            let status = match &entry.id {
                Some(id) => {
                    let mut status = workflow
                        .status(id)
                        .cloned()
                        .ok_or_else(|| WorkflowError::UnknownStatus(id.clone()))?;
                    status.name = entry.name.clone();
                    status.position = entry.position;
                    status.is_initial = entry.is_initial;
                    status.is_final = entry.is_final;
                    status
                }
                None => Status::new(workflow.id.clone(), entry.name.clone(), entry.position)
                    .with_initial(entry.is_initial)
                    .with_final(entry.is_final),
            };
            statuses.push(status);
        }

        // Endpoints resolve against the submission itself: a transition
        // kept against a dropped status is an unknown status, since the
        // described aggregate would dangle.
        let mut transitions: Vec<Transition> = Vec::with_capacity(request.transitions.len());
        for entry in &request.transitions {
            let from = resolve_status_ref(&entry.from, &statuses)?;
            let to = resolve_status_ref(&entry.to, &statuses)?;
            let transition = match &entry.id {
                Some(id) => {
                    let mut transition = workflow
                        .transition(id)
                        .cloned()
                        .ok_or_else(|| WorkflowError::UnknownTransition(id.clone()))?;
                    transition.from_status = from;
                    transition.to_status = to;
                    transition.name = entry.name.clone();
                    transition
                }
                None => Transition::new(workflow.id.clone(), from, to, entry.name.clone()),
            };
            transitions.push(transition);
        }

        workflow.replace_graph(statuses, transitions);

        workflow.validate()?;
        self.enforce_default_policy(&workflow).await?;

        let stored = self.repository.update(workflow).await?;
        tracing::info!(
            workflow_id = %stored.id,
            statuses = stored.status_count(),
            transitions = stored.transition_count(),
            "Workflow updated"
        );
        Ok(stored)
    }

    /// Delete a workflow and everything it owns
    pub async fn delete_workflow(&self, id: &WorkflowId) -> WorkflowResult<()> {
        self.repository.delete(id).await?;
        tracing::info!(workflow_id = %id, "Workflow deleted");
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Get a workflow by id
    pub async fn workflow(&self, id: &WorkflowId) -> WorkflowResult<Workflow> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| WorkflowError::WorkflowNotFound(id.clone()))
    }

    /// List a project's workflows
    pub async fn project_workflows(&self, project_id: &ProjectId) -> WorkflowResult<Vec<Workflow>> {
        self.repository.list_for_project(project_id).await
    }

    /// The project's default workflow
    pub async fn default_workflow(&self, project_id: &ProjectId) -> WorkflowResult<Workflow> {
        self.repository
            .default_for_project(project_id)
            .await?
            .ok_or_else(|| WorkflowError::NoDefaultWorkflow(project_id.clone()))
    }

    /// Is the move from `from` to `to` legal in this workflow?
    ///
    /// Loads the workflow and delegates to [`TransitionChecker`]; the
    /// answer is a denial with a message, never an error, for moves the
    /// workflow cannot express.
    pub async fn check_transition(
        &self,
        workflow_id: &WorkflowId,
        from: &StatusId,
        to: &StatusId,
    ) -> WorkflowResult<TransitionCheck> {
        let workflow = self.workflow(workflow_id).await?;
        let check = TransitionChecker::new(&workflow).check(from, to);
        tracing::debug!(
            workflow_id = %workflow_id,
            allowed = check.allowed,
            "Transition checked"
        );
        Ok(check)
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Apply the configured policy when the aggregate claims the
    /// project default and another workflow already holds it.
    async fn enforce_default_policy(&self, workflow: &Workflow) -> WorkflowResult<()> {
        if !workflow.is_default {
            return Ok(());
        }
        let current = match self
            .repository
            .default_for_project(&workflow.project_id)
            .await?
        {
            Some(current) if current.id != workflow.id => current,
            _ => return Ok(()),
        };

        match self.default_policy {
            DefaultPolicy::Reject => Err(WorkflowError::DefaultWorkflowExists {
                project: workflow.project_id.clone(),
                existing: current.id,
            }),
            DefaultPolicy::Reassign => {
                let mut previous = current;
                previous.set_default(false);
                let previous_id = previous.id.clone();
                self.repository.update(previous).await?;
                tracing::info!(
                    workflow_id = %previous_id,
                    project_id = %workflow.project_id,
                    "Previous default workflow un-flagged"
                );
                Ok(())
            }
        }
    }
}

/// Resolve a submitted endpoint reference to a concrete status id
///
/// Both forms resolve against the submitted status list: an index is a
/// position in it, an id must belong to one of its entries.
fn resolve_status_ref(reference: &StatusRef, submitted: &[Status]) -> WorkflowResult<StatusId> {
    match reference {
        StatusRef::Index(index) => submitted
            .get(*index)
            .map(|s| s.id.clone())
            .ok_or(WorkflowError::InvalidStatusRef {
                index: *index,
                len: submitted.len(),
            }),
        StatusRef::Id(id) => submitted
            .iter()
            .find(|s| &s.id == id)
            .map(|s| s.id.clone())
            .ok_or_else(|| WorkflowError::UnknownStatus(id.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_store::InMemoryWorkflowRepository;

    fn make_service() -> (WorkflowService, Arc<InMemoryWorkflowRepository>) {
        let repository = Arc::new(InMemoryWorkflowRepository::new());
        (WorkflowService::new(repository.clone()), repository)
    }

    /// To Do -> In Progress -> Done, the standard shape
    fn make_bug_flow_request() -> CreateWorkflowRequest {
        CreateWorkflowRequest::new("Bug Flow")
            .with_description("Default flow for bug issues")
            .with_status("To Do", 0, true, false)
            .with_status("In Progress", 1, false, false)
            .with_status("Done", 2, false, true)
            .with_transition(0, 1, "Start Progress")
            .with_transition(1, 2, "Finish")
    }

    fn status_id(workflow: &Workflow, name: &str) -> StatusId {
        workflow.status_by_name(name).unwrap().id.clone()
    }

    #[tokio::test]
    async fn test_create_then_check_transitions() {
        let (service, _) = make_service();
        let project = ProjectId::generate();

        let wf = service
            .create_workflow(project, make_bug_flow_request())
            .await
            .unwrap();
        assert_eq!(wf.name, "Bug Flow");
        assert_eq!(wf.status_count(), 3);
        assert_eq!(wf.transition_count(), 2);

        let todo = status_id(&wf, "To Do");
        let doing = status_id(&wf, "In Progress");
        let done = status_id(&wf, "Done");

        let check = service
            .check_transition(&wf.id, &todo, &doing)
            .await
            .unwrap();
        assert!(check.allowed);

        // Adjacent only: Done is two hops from To Do.
        let check = service.check_transition(&wf.id, &todo, &done).await.unwrap();
        assert!(!check.allowed);
        let message = check.message.unwrap();
        assert!(message.contains("To Do"));
        assert!(message.contains("Done"));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (service, repository) = make_service();
        let project = ProjectId::generate();

        let request = CreateWorkflowRequest::new("  ").with_status("A", 0, true, true);
        let result = service.create_workflow(project.clone(), request).await;
        assert!(matches!(result, Err(WorkflowError::EmptyWorkflowName)));
        assert!(repository
            .list_for_project(&project)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_create_aborts_before_persisting_invalid_graphs() {
        let (service, repository) = make_service();
        let project = ProjectId::generate();

        // No final status anywhere.
        let request = CreateWorkflowRequest::new("Open Ended")
            .with_status("To Do", 0, true, false)
            .with_status("In Progress", 1, false, false)
            .with_transition(0, 1, "Start Progress");

        let result = service.create_workflow(project.clone(), request).await;
        assert!(matches!(result, Err(WorkflowError::NoFinalStatus)));
        assert!(repository
            .list_for_project(&project)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_status_ref() {
        let (service, _) = make_service();

        let request = CreateWorkflowRequest::new("Flow")
            .with_status("A", 0, true, false)
            .with_status("B", 1, false, true)
            .with_transition(0, 9, "Into thin air");

        let result = service
            .create_workflow(ProjectId::generate(), request)
            .await;
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidStatusRef { index: 9, len: 2 })
        ));
    }

    #[tokio::test]
    async fn test_default_conflict_is_rejected_by_default() {
        let (service, repository) = make_service();
        let project = ProjectId::generate();

        let first = service
            .create_workflow(project.clone(), make_bug_flow_request().with_default(true))
            .await
            .unwrap();

        let second = CreateWorkflowRequest::new("Another Flow")
            .with_default(true)
            .with_status("Open", 0, true, false)
            .with_status("Closed", 1, false, true)
            .with_transition(0, 1, "Close");
        let result = service.create_workflow(project.clone(), second).await;
        match result {
            Err(WorkflowError::DefaultWorkflowExists { existing, .. }) => {
                assert_eq!(existing, first.id);
            }
            other => panic!("expected DefaultWorkflowExists, got {:?}", other),
        }
        assert_eq!(repository.list_for_project(&project).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reassign_policy_moves_the_default_flag() {
        let repository = Arc::new(InMemoryWorkflowRepository::new());
        let service =
            WorkflowService::new(repository).with_default_policy(DefaultPolicy::Reassign);
        let project = ProjectId::generate();

        let first = service
            .create_workflow(project.clone(), make_bug_flow_request().with_default(true))
            .await
            .unwrap();

        let second_request = CreateWorkflowRequest::new("Task Flow")
            .with_default(true)
            .with_status("Open", 0, true, false)
            .with_status("Closed", 1, false, true)
            .with_transition(0, 1, "Close");
        let second = service
            .create_workflow(project.clone(), second_request)
            .await
            .unwrap();

        let current = service.default_workflow(&project).await.unwrap();
        assert_eq!(current.id, second.id);

        let previous = service.workflow(&first.id).await.unwrap();
        assert!(!previous.is_default);
    }

    #[tokio::test]
    async fn test_update_is_a_full_replace() {
        let (service, _) = make_service();
        let project = ProjectId::generate();
        let wf = service
            .create_workflow(project, make_bug_flow_request())
            .await
            .unwrap();

        let todo = status_id(&wf, "To Do");
        let doing = status_id(&wf, "In Progress");
        let start_progress = wf.transition_between(&todo, &doing).unwrap().id.clone();

        // Keep To Do (renamed) and In Progress, drop Done, add Closed;
        // keep Start Progress, drop Finish, add a closing transition.
        let request = UpdateWorkflowRequest::new("Bug Flow")
            .with_description("Tightened up")
            .keep_status(todo.clone(), "Backlog", 0, true, false)
            .keep_status(doing.clone(), "In Progress", 1, false, false)
            .add_status("Closed", 2, false, true)
            .keep_transition(start_progress, todo.clone(), doing.clone(), "Start Progress")
            .add_transition(1usize, 2usize, "Close");

        let updated = service.update_workflow(&wf.id, request).await.unwrap();

        assert_eq!(updated.status_count(), 3);
        assert!(updated.status_by_name("Done").is_none());
        assert!(updated.status_by_name("Backlog").is_some());
        assert_eq!(updated.initial_status().unwrap().name, "Backlog");
        assert_eq!(updated.transition_count(), 2);

        let closed = status_id(&updated, "Closed");
        let check = service
            .check_transition(&updated.id, &doing, &closed)
            .await
            .unwrap();
        assert!(check.allowed);
    }

    #[tokio::test]
    async fn test_update_rejects_transitions_kept_against_dropped_statuses() {
        let (service, _) = make_service();
        let wf = service
            .create_workflow(ProjectId::generate(), make_bug_flow_request())
            .await
            .unwrap();

        let todo = status_id(&wf, "To Do");
        let doing = status_id(&wf, "In Progress");
        let done = status_id(&wf, "Done");
        let start_progress = wf.transition_between(&todo, &doing).unwrap().id.clone();
        let finish = wf.transition_between(&doing, &done).unwrap().id.clone();

        // Drops To Do but keeps the transition leaving it; the endpoint
        // no longer names a submitted status.
        let request = UpdateWorkflowRequest::new("Bug Flow")
            .keep_status(doing.clone(), "In Progress", 1, true, false)
            .keep_status(done.clone(), "Done", 2, false, true)
            .keep_transition(start_progress, todo.clone(), doing.clone(), "Start Progress")
            .keep_transition(finish, doing.clone(), done.clone(), "Finish");

        let result = service.update_workflow(&wf.id, request).await;
        assert!(matches!(
            result,
            Err(WorkflowError::UnknownStatus(id)) if id == todo
        ));
    }

    #[tokio::test]
    async fn test_update_can_recreate_a_status_under_a_vacated_name() {
        let (service, _) = make_service();
        let wf = service
            .create_workflow(ProjectId::generate(), make_bug_flow_request())
            .await
            .unwrap();

        let todo = status_id(&wf, "To Do");
        let doing = status_id(&wf, "In Progress");
        let old_done = status_id(&wf, "Done");
        let start_progress = wf.transition_between(&todo, &doing).unwrap().id.clone();

        // Drop the stored "Done" and add a brand-new final status under
        // the same name in the same submission.
        let request = UpdateWorkflowRequest::new("Bug Flow")
            .keep_status(todo.clone(), "To Do", 0, true, false)
            .keep_status(doing.clone(), "In Progress", 1, false, false)
            .add_status("Done", 2, false, true)
            .keep_transition(start_progress, todo.clone(), doing.clone(), "Start Progress")
            .add_transition(1usize, 2usize, "Finish");

        let updated = service.update_workflow(&wf.id, request).await.unwrap();

        assert_eq!(updated.status_count(), 3);
        let new_done = updated.status_by_name("Done").unwrap().id.clone();
        assert_ne!(new_done, old_done);
        assert!(updated.status_by_name("Done").unwrap().is_final);

        let check = service
            .check_transition(&updated.id, &doing, &new_done)
            .await
            .unwrap();
        assert!(check.allowed);
    }

    #[tokio::test]
    async fn test_update_can_swap_endpoints_of_kept_transitions() {
        let (service, _) = make_service();
        let request = CreateWorkflowRequest::new("Triage Flow")
            .with_status("New", 0, true, false)
            .with_status("Accepted", 1, false, false)
            .with_status("Rejected", 2, false, true)
            .with_transition(0, 1, "Accept")
            .with_transition(0, 2, "Reject");
        let wf = service
            .create_workflow(ProjectId::generate(), request)
            .await
            .unwrap();

        let new = status_id(&wf, "New");
        let accepted = status_id(&wf, "Accepted");
        let rejected = status_id(&wf, "Rejected");
        let accept = wf.transition_between(&new, &accepted).unwrap().id.clone();
        let reject = wf.transition_between(&new, &rejected).unwrap().id.clone();

        // Both transitions kept, each re-pointed at the other's target;
        // the pair sets collide transiently but not in the result.
        let request = UpdateWorkflowRequest::new("Triage Flow")
            .keep_status(new.clone(), "New", 0, true, false)
            .keep_status(accepted.clone(), "Accepted", 1, false, false)
            .keep_status(rejected.clone(), "Rejected", 2, false, true)
            .keep_transition(accept.clone(), new.clone(), rejected.clone(), "Reject")
            .keep_transition(reject.clone(), new.clone(), accepted.clone(), "Accept");

        let updated = service.update_workflow(&wf.id, request).await.unwrap();

        assert_eq!(updated.transition_count(), 2);
        assert_eq!(updated.transition_between(&new, &rejected).unwrap().id, accept);
        assert_eq!(updated.transition_between(&new, &accepted).unwrap().id, reject);
    }

    #[tokio::test]
    async fn test_update_rejects_duplicate_transition_pairs() {
        let (service, _) = make_service();
        let wf = service
            .create_workflow(ProjectId::generate(), make_bug_flow_request())
            .await
            .unwrap();

        let todo = status_id(&wf, "To Do");
        let doing = status_id(&wf, "In Progress");
        let done = status_id(&wf, "Done");

        // Two submitted transitions describe the same edge.
        let request = UpdateWorkflowRequest::new("Bug Flow")
            .keep_status(todo.clone(), "To Do", 0, true, false)
            .keep_status(doing.clone(), "In Progress", 1, false, false)
            .keep_status(done.clone(), "Done", 2, false, true)
            .add_transition(0usize, 1usize, "Start Progress")
            .add_transition(0usize, 1usize, "Start Progress again")
            .add_transition(1usize, 2usize, "Finish");

        let result = service.update_workflow(&wf.id, request).await;
        assert!(matches!(
            result,
            Err(WorkflowError::DuplicateTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_missing_workflow() {
        let (service, _) = make_service();
        let request = UpdateWorkflowRequest::new("Ghost").add_status("A", 0, true, true);

        let result = service
            .update_workflow(&WorkflowId::generate(), request)
            .await;
        assert!(matches!(result, Err(WorkflowError::WorkflowNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_workflow() {
        let (service, _) = make_service();
        let wf = service
            .create_workflow(ProjectId::generate(), make_bug_flow_request())
            .await
            .unwrap();

        service.delete_workflow(&wf.id).await.unwrap();

        let result = service.workflow(&wf.id).await;
        assert!(matches!(result, Err(WorkflowError::WorkflowNotFound(_))));

        let result = service.delete_workflow(&wf.id).await;
        assert!(matches!(result, Err(WorkflowError::WorkflowNotFound(_))));
    }

    #[tokio::test]
    async fn test_default_workflow_lookup_when_none_is_flagged() {
        let (service, _) = make_service();
        let project = ProjectId::generate();
        service
            .create_workflow(project.clone(), make_bug_flow_request())
            .await
            .unwrap();

        let result = service.default_workflow(&project).await;
        assert!(matches!(result, Err(WorkflowError::NoDefaultWorkflow(_))));
    }

    #[tokio::test]
    async fn test_check_transition_on_missing_workflow() {
        let (service, _) = make_service();
        let result = service
            .check_transition(
                &WorkflowId::generate(),
                &StatusId::generate(),
                &StatusId::generate(),
            )
            .await;
        assert!(matches!(result, Err(WorkflowError::WorkflowNotFound(_))));
    }
}
