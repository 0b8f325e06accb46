// src/db/activity_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    models::activity::{Activity, ActivityFilters, NewActivity},
};

const ACTIVITY_COLUMNS: &str = r#"
    id, type, deal_id, client_id, user_id, subject, content, duration, activity_date, created_at
"#;

// Histórico: só INSERT e SELECT, nada de UPDATE/DELETE aqui.
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, new: &NewActivity) -> Result<Activity, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO activities (
                type, deal_id, client_id, user_id, subject, content, duration, activity_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ACTIVITY_COLUMNS}
            "#
        );
        let activity = sqlx::query_as::<_, Activity>(&sql)
            .bind(new.kind)
            .bind(new.deal_id)
            .bind(new.client_id)
            .bind(new.user_id)
            .bind(&new.subject)
            .bind(&new.content)
            .bind(new.duration)
            .bind(new.activity_date)
            .fetch_one(executor)
            .await?;
        Ok(activity)
    }

    pub async fn create(&self, new: &NewActivity) -> Result<Activity, AppError> {
        self.insert(&self.pool, new).await
    }

    pub async fn list(
        &self,
        owner: Option<Uuid>,
        filters: &ActivityFilters,
        page: Pagination,
    ) -> Result<Vec<Activity>, AppError> {
        let sql = format!(
            r#"
            SELECT {ACTIVITY_COLUMNS}
            FROM activities
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::uuid IS NULL OR deal_id = $2)
              AND ($3::uuid IS NULL OR client_id = $3)
              AND ($4::activity_type IS NULL OR type = $4)
            ORDER BY created_at DESC
            OFFSET $5 LIMIT $6
            "#
        );
        let activities = sqlx::query_as::<_, Activity>(&sql)
            .bind(owner)
            .bind(filters.deal_id)
            .bind(filters.client_id)
            .bind(filters.kind)
            .bind(page.offset())
            .bind(page.limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(activities)
    }
}
