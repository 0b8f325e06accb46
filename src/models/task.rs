// src/models/task.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// Conjunto canônico de status. O dashboard conta `todo`+`in_progress` como pendentes
// e `done` como concluídas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Task {
    pub id: Uuid,
    #[schema(example = "Ligar para o cliente")]
    pub title: String,
    pub description: Option<String>,

    // Pode ficar ligada a um negócio e/ou a um cliente
    pub deal_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,

    pub status: TaskStatus,
    pub priority: TaskPriority,

    #[schema(value_type = Option<String>, format = Date, example = "2025-06-30")]
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTaskPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub description: Option<String>,
    pub deal_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub priority: Option<TaskPriority>,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
}

impl UpdateTaskPayload {
    /// Aplica os campos enviados. Status passa por `set_status` para manter `completed_at`.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if self.description.is_some() {
            task.description = self.description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if self.due_date.is_some() {
            task.due_date = self.due_date;
        }
        if self.assignee_id.is_some() {
            task.assignee_id = self.assignee_id;
        }
        if let Some(status) = self.status {
            task.set_status(status, now);
        }
    }
}

impl Task {
    // Entrar em `done` carimba completed_at; sair de `done` limpa.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        match (self.status, status) {
            (TaskStatus::Done, TaskStatus::Done) => {}
            (_, TaskStatus::Done) => self.completed_at = Some(now),
            (_, _) => self.completed_at = None,
        }
        self.status = status;
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub deal_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_task(status: TaskStatus) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: "Enviar proposta".into(),
            description: None,
            deal_id: None,
            client_id: None,
            assignee_id: None,
            status,
            priority: TaskPriority::Medium,
            due_date: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn entering_done_stamps_completion() {
        let mut task = sample_task(TaskStatus::InProgress);
        let now = Utc::now();
        task.set_status(TaskStatus::Done, now);
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.completed_at, Some(now));
    }

    #[test]
    fn staying_done_keeps_first_stamp() {
        let mut task = sample_task(TaskStatus::Todo);
        let first = Utc::now();
        task.set_status(TaskStatus::Done, first);
        task.set_status(TaskStatus::Done, first + Duration::hours(2));
        assert_eq!(task.completed_at, Some(first));
    }

    #[test]
    fn reopening_clears_completion() {
        let mut task = sample_task(TaskStatus::Todo);
        task.set_status(TaskStatus::Done, Utc::now());
        task.set_status(TaskStatus::Todo, Utc::now());
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn patch_routes_status_through_completion_rule() {
        let mut task = sample_task(TaskStatus::Todo);
        let patch: UpdateTaskPayload =
            serde_json::from_str(r#"{"status": "done", "priority": "critical"}"#).unwrap();
        let now = Utc::now();
        patch.apply_to(&mut task, now);
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.priority, TaskPriority::Critical);
        assert_eq!(task.completed_at, Some(now));
        assert_eq!(task.title, "Enviar proposta");
    }

    #[test]
    fn in_progress_wire_name() {
        let status: TaskStatus = serde_json::from_str(r#""in_progress""#).unwrap();
        assert_eq!(status, TaskStatus::InProgress);
    }
}
