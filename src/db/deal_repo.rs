// src/db/deal_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    models::deal::{CreateDealPayload, Deal, DealCard, DealFilters},
};

const DEAL_COLUMNS: &str = r#"
    id, title, description, client_id, pipeline_id, stage_id, manager_id,
    amount, currency, expected_close_date, closed_at, status, lost_reason,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct DealRepository {
    pool: PgPool,
}

impl DealRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Deal>, AppError> {
        let sql = format!("SELECT {DEAL_COLUMNS} FROM deals WHERE id = $1");
        let deal = sqlx::query_as::<_, Deal>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(deal)
    }

    /// Lê o negócio travando a linha até o fim da transação.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {DEAL_COLUMNS} FROM deals WHERE id = $1 FOR UPDATE");
        let deal = sqlx::query_as::<_, Deal>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(deal)
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM deals WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }

    pub async fn list(
        &self,
        owner: Option<Uuid>,
        filters: &DealFilters,
        page: Pagination,
    ) -> Result<Vec<Deal>, AppError> {
        let sql = format!(
            r#"
            SELECT {DEAL_COLUMNS}
            FROM deals
            WHERE ($1::uuid IS NULL OR manager_id = $1)
              AND ($2::uuid IS NULL OR pipeline_id = $2)
              AND ($3::uuid IS NULL OR stage_id = $3)
              AND ($4::deal_status IS NULL OR status = $4)
              AND ($5::uuid IS NULL OR manager_id = $5)
            ORDER BY created_at DESC
            OFFSET $6 LIMIT $7
            "#
        );
        let deals = sqlx::query_as::<_, Deal>(&sql)
            .bind(owner)
            .bind(filters.pipeline_id)
            .bind(filters.stage_id)
            .bind(filters.status)
            .bind(filters.manager_id)
            .bind(page.offset())
            .bind(page.limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(deals)
    }

    // Status inicial `open` vem do DEFAULT da coluna
    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &CreateDealPayload,
        manager_id: Uuid,
        currency: &str,
    ) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO deals (
                title, description, client_id, pipeline_id, stage_id, manager_id,
                amount, currency, expected_close_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {DEAL_COLUMNS}
            "#
        );
        let deal = sqlx::query_as::<_, Deal>(&sql)
            .bind(&payload.title)
            .bind(&payload.description)
            .bind(payload.client_id)
            .bind(payload.pipeline_id)
            .bind(payload.stage_id)
            .bind(manager_id)
            .bind(payload.amount)
            .bind(currency)
            .bind(payload.expected_close_date)
            .fetch_one(executor)
            .await?;
        Ok(deal)
    }

    /// Grava o estado completo do negócio.
    pub async fn update<'e, E>(&self, executor: E, deal: &Deal) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE deals
            SET title = $2, description = $3, client_id = $4, stage_id = $5, manager_id = $6,
                amount = $7, currency = $8, expected_close_date = $9, closed_at = $10,
                status = $11, lost_reason = $12, updated_at = NOW()
            WHERE id = $1
            RETURNING {DEAL_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Deal>(&sql)
            .bind(deal.id)
            .bind(&deal.title)
            .bind(&deal.description)
            .bind(deal.client_id)
            .bind(deal.stage_id)
            .bind(deal.manager_id)
            .bind(deal.amount)
            .bind(&deal.currency)
            .bind(deal.expected_close_date)
            .bind(deal.closed_at)
            .bind(deal.status)
            .bind(&deal.lost_reason)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ResourceNotFound("Negócio"))?;
        Ok(updated)
    }

    // Tarefas e atividades do negócio saem em cascata
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM deals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound("Negócio"));
        }
        Ok(())
    }

    /// Cartões abertos de um funil, para montar as colunas do Kanban.
    pub async fn open_cards(
        &self,
        pipeline_id: Uuid,
        owner: Option<Uuid>,
    ) -> Result<Vec<DealCard>, AppError> {
        let cards = sqlx::query_as::<_, DealCard>(
            r#"
            SELECT id, stage_id, title, amount, client_id
            FROM deals
            WHERE pipeline_id = $1
              AND status = 'open'
              AND ($2::uuid IS NULL OR manager_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(pipeline_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(cards)
    }
}
