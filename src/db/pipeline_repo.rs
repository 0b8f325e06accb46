// src/db/pipeline_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::pipeline::{CreatePipelinePayload, CreateStagePayload, DealStage, Pipeline},
};

const PIPELINE_COLUMNS: &str =
    "id, name, description, sort_order, is_active, created_at, updated_at";

const STAGE_COLUMNS: &str = r#"
    id, pipeline_id, name, description, color, sort_order, win_probability,
    is_final, is_won, created_at
"#;

#[derive(Clone)]
pub struct PipelineRepository {
    pool: PgPool,
}

impl PipelineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  FUNIS
    // =========================================================================

    pub async fn list_active(&self) -> Result<Vec<Pipeline>, AppError> {
        let sql = format!(
            "SELECT {PIPELINE_COLUMNS} FROM pipelines WHERE is_active ORDER BY sort_order, created_at"
        );
        let pipelines = sqlx::query_as::<_, Pipeline>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(pipelines)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Pipeline>, AppError> {
        let sql = format!("SELECT {PIPELINE_COLUMNS} FROM pipelines WHERE id = $1");
        let pipeline = sqlx::query_as::<_, Pipeline>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(pipeline)
    }

    pub async fn count<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pipelines")
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &CreatePipelinePayload,
    ) -> Result<Pipeline, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO pipelines (name, description, sort_order)
            VALUES ($1, $2, $3)
            RETURNING {PIPELINE_COLUMNS}
            "#
        );
        let pipeline = sqlx::query_as::<_, Pipeline>(&sql)
            .bind(&payload.name)
            .bind(&payload.description)
            .bind(payload.sort_order)
            .fetch_one(executor)
            .await?;
        Ok(pipeline)
    }

    pub async fn update(&self, pipeline: &Pipeline) -> Result<Pipeline, AppError> {
        let sql = format!(
            r#"
            UPDATE pipelines
            SET name = $2, description = $3, sort_order = $4, is_active = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {PIPELINE_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Pipeline>(&sql)
            .bind(pipeline.id)
            .bind(&pipeline.name)
            .bind(&pipeline.description)
            .bind(pipeline.sort_order)
            .bind(pipeline.is_active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::ResourceNotFound("Funil"))?;
        Ok(updated)
    }

    // =========================================================================
    //  ETAPAS
    // =========================================================================

    pub async fn list_stages(&self, pipeline_id: Uuid) -> Result<Vec<DealStage>, AppError> {
        let sql = format!(
            "SELECT {STAGE_COLUMNS} FROM deal_stages WHERE pipeline_id = $1 ORDER BY sort_order, created_at"
        );
        let stages = sqlx::query_as::<_, DealStage>(&sql)
            .bind(pipeline_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(stages)
    }

    pub async fn find_stage<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<DealStage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {STAGE_COLUMNS} FROM deal_stages WHERE id = $1");
        let stage = sqlx::query_as::<_, DealStage>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(stage)
    }

    /// Trava a etapa até o fim da transação; inserções de negócios nela esperam.
    pub async fn lock_stage<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<DealStage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {STAGE_COLUMNS} FROM deal_stages WHERE id = $1 FOR UPDATE");
        let stage = sqlx::query_as::<_, DealStage>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(stage)
    }

    pub async fn create_stage<'e, E>(
        &self,
        executor: E,
        pipeline_id: Uuid,
        payload: &CreateStagePayload,
    ) -> Result<DealStage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO deal_stages (
                pipeline_id, name, description, color, sort_order, win_probability, is_final, is_won
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {STAGE_COLUMNS}
            "#
        );
        let stage = sqlx::query_as::<_, DealStage>(&sql)
            .bind(pipeline_id)
            .bind(&payload.name)
            .bind(&payload.description)
            .bind(&payload.color)
            .bind(payload.sort_order)
            .bind(payload.win_probability)
            .bind(payload.is_final)
            .bind(payload.is_won)
            .fetch_one(executor)
            .await?;
        Ok(stage)
    }

    pub async fn update_stage(&self, stage: &DealStage) -> Result<DealStage, AppError> {
        let sql = format!(
            r#"
            UPDATE deal_stages
            SET name = $2, description = $3, color = $4, sort_order = $5,
                win_probability = $6, is_final = $7, is_won = $8
            WHERE id = $1
            RETURNING {STAGE_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, DealStage>(&sql)
            .bind(stage.id)
            .bind(&stage.name)
            .bind(&stage.description)
            .bind(&stage.color)
            .bind(stage.sort_order)
            .bind(stage.win_probability)
            .bind(stage.is_final)
            .bind(stage.is_won)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::ResourceNotFound("Etapa"))?;
        Ok(updated)
    }

    /// Quantos negócios ainda apontam para a etapa.
    pub async fn count_deals_in_stage<'e, E>(
        &self,
        executor: E,
        stage_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM deals WHERE stage_id = $1")
            .bind(stage_id)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    pub async fn delete_stage<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM deal_stages WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound("Etapa"));
        }
        Ok(())
    }
}
