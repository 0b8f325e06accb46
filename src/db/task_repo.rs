// src/db/task_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    models::task::{CreateTaskPayload, Task, TaskFilters, TaskPriority},
};

const TASK_COLUMNS: &str = r#"
    id, title, description, deal_id, client_id, assignee_id, status, priority,
    due_date, completed_at, created_at, updated_at
"#;

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    // Mais urgentes primeiro; sem prazo vão para o fim
    pub async fn list(
        &self,
        owner: Option<Uuid>,
        filters: &TaskFilters,
        page: Pagination,
    ) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE ($1::uuid IS NULL OR assignee_id = $1)
              AND ($2::task_status IS NULL OR status = $2)
              AND ($3::task_priority IS NULL OR priority = $3)
              AND ($4::uuid IS NULL OR deal_id = $4)
              AND ($5::uuid IS NULL OR client_id = $5)
              AND ($6::uuid IS NULL OR assignee_id = $6)
            ORDER BY due_date ASC NULLS LAST, created_at DESC
            OFFSET $7 LIMIT $8
            "#
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner)
            .bind(filters.status)
            .bind(filters.priority)
            .bind(filters.deal_id)
            .bind(filters.client_id)
            .bind(filters.assignee_id)
            .bind(page.offset())
            .bind(page.limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    pub async fn create(
        &self,
        payload: &CreateTaskPayload,
        assignee_id: Uuid,
    ) -> Result<Task, AppError> {
        let sql = format!(
            r#"
            INSERT INTO tasks (title, description, deal_id, client_id, assignee_id, priority, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(&payload.title)
            .bind(&payload.description)
            .bind(payload.deal_id)
            .bind(payload.client_id)
            .bind(assignee_id)
            .bind(payload.priority.unwrap_or(TaskPriority::Medium))
            .bind(payload.due_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn update(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, assignee_id = $4, status = $5, priority = $6,
                due_date = $7, completed_at = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.assignee_id)
            .bind(task.status)
            .bind(task.priority)
            .bind(task.due_date)
            .bind(task.completed_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::ResourceNotFound("Tarefa"))?;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound("Tarefa"));
        }
        Ok(())
    }
}
