// src/services/task_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    db::{ClientRepository, DealRepository, TaskRepository, UserRepository},
    models::{
        auth::Caller,
        task::{CreateTaskPayload, Task, TaskFilters, UpdateTaskPayload},
    },
    services::{access, user_service::ensure_user},
};

#[derive(Clone)]
pub struct TaskService {
    repo: TaskRepository,
    deal_repo: DealRepository,
    client_repo: ClientRepository,
    user_repo: UserRepository,
}

impl TaskService {
    pub fn new(
        repo: TaskRepository,
        deal_repo: DealRepository,
        client_repo: ClientRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self { repo, deal_repo, client_repo, user_repo }
    }

    pub async fn list(
        &self,
        caller: Caller,
        filters: &TaskFilters,
        page: Pagination,
    ) -> Result<Vec<Task>, AppError> {
        let owner = access::scope(caller).owner_filter();
        self.repo.list(owner, filters, page).await
    }

    pub async fn get(&self, caller: Caller, id: Uuid) -> Result<Task, AppError> {
        let task = self.repo.find_by_id(id).await?.ok_or(AppError::ResourceNotFound("Tarefa"))?;
        access::ensure_visible(caller, &task)?;
        Ok(task)
    }

    pub async fn create(&self, caller: Caller, payload: &CreateTaskPayload) -> Result<Task, AppError> {
        if let Some(deal_id) = payload.deal_id {
            if !self.deal_repo.exists(deal_id).await? {
                return Err(AppError::ResourceNotFound("Negócio"));
            }
        }
        if let Some(client_id) = payload.client_id {
            if !self.client_repo.exists(client_id).await? {
                return Err(AppError::ResourceNotFound("Cliente"));
            }
        }

        ensure_user(&self.user_repo, payload.assignee_id).await?;

        let assignee_id = access::owner_or_caller(caller, payload.assignee_id);
        self.repo.create(payload, assignee_id).await
    }

    pub async fn update(
        &self,
        caller: Caller,
        id: Uuid,
        payload: &UpdateTaskPayload,
    ) -> Result<Task, AppError> {
        let mut task = self.get(caller, id).await?;
        ensure_user(&self.user_repo, payload.assignee_id).await?;

        payload.apply_to(&mut task, Utc::now());
        self.repo.update(&task).await
    }

    pub async fn delete(&self, caller: Caller, id: Uuid) -> Result<(), AppError> {
        let task = self.repo.find_by_id(id).await?.ok_or(AppError::ResourceNotFound("Tarefa"))?;
        access::ensure_can_delete(caller, &task)?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::PgPool;

    use crate::{
        models::{auth::Role, task::TaskStatus},
        test_support::{self, payload},
    };

    #[sqlx::test]
    async fn assignee_must_exist(pool: PgPool) {
        let state = test_support::state(pool.clone());
        let manager = test_support::user(&pool, "gerente", Role::Manager).await;
        let service = &state.task_service;

        let err = service
            .create(manager, &payload(json!({ "title": "Ligar", "assignee_id": Uuid::new_v4() })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound("Usuário")));

        let task = service.create(manager, &payload(json!({ "title": "Ligar" }))).await.unwrap();
        assert_eq!(task.assignee_id, Some(manager.id));

        let err = service
            .update(manager, task.id, &payload(json!({ "assignee_id": Uuid::new_v4() })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound("Usuário")));

        let done = service
            .update(manager, task.id, &payload(json!({ "status": "done" })))
            .await
            .unwrap();
        assert_eq!(done.status, TaskStatus::Done);
        assert!(done.completed_at.is_some());
    }
}
