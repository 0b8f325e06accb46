// src/db/dashboard_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        activity::Activity,
        dashboard::{
            ClientCounts, DashboardStats, DealCounts, Revenue, SalesChartEntry, StageSnapshot,
            TaskCounts,
        },
    },
};

// Todas as consultas recebem `owner`: None = visão global, Some(id) = só o que é do gerente.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Cards do topo
    pub async fn stats(&self, owner: Option<Uuid>) -> Result<DashboardStats, AppError> {
        // Transação só de leitura para um retrato consistente dos números
        let mut tx = self.pool.begin().await?;

        // A. Negócios por status
        let deals = sqlx::query_as::<_, DealCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'open') AS open,
                COUNT(*) FILTER (WHERE status = 'won') AS won,
                COUNT(*) FILTER (WHERE status = 'lost') AS lost
            FROM deals
            WHERE ($1::uuid IS NULL OR manager_id = $1)
            "#,
        )
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        // B. Receita dos ganhos: total e mês corrente
        let revenue = sqlx::query_as::<_, Revenue>(
            r#"
            SELECT
                COALESCE(SUM(amount), 0) AS total,
                COALESCE(SUM(amount) FILTER (WHERE closed_at >= date_trunc('month', NOW())), 0) AS month
            FROM deals
            WHERE status = 'won'
              AND ($1::uuid IS NULL OR manager_id = $1)
            "#,
        )
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        // C. Clientes
        let clients = sqlx::query_as::<_, ClientCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'lead') AS leads,
                COUNT(*) FILTER (WHERE status = 'client') AS clients
            FROM clients
            WHERE ($1::uuid IS NULL OR manager_id = $1)
            "#,
        )
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        // D. Tarefas (canceladas só entram no total)
        let tasks = sqlx::query_as::<_, TaskCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status IN ('todo', 'in_progress')) AS pending,
                COUNT(*) FILTER (WHERE status = 'done') AS completed
            FROM tasks
            WHERE ($1::uuid IS NULL OR assignee_id = $1)
            "#,
        )
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let conversion_rate = deals.conversion_rate();
        Ok(DashboardStats { deals, revenue, clients, tasks, conversion_rate })
    }

    // 2. Últimas atividades
    pub async fn recent_activities(
        &self,
        owner: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<Activity>, AppError> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, type, deal_id, client_id, user_id, subject, content, duration,
                   activity_date, created_at
            FROM activities
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(activities)
    }

    // 3. Ganhos por dia de fechamento
    pub async fn sales_chart(
        &self,
        owner: Option<Uuid>,
        days: i32,
    ) -> Result<Vec<SalesChartEntry>, AppError> {
        let entries = sqlx::query_as::<_, SalesChartEntry>(
            r#"
            SELECT
                TO_CHAR(DATE(closed_at), 'YYYY-MM-DD') AS date,
                COUNT(*) AS count,
                COALESCE(SUM(amount), 0) AS amount
            FROM deals
            WHERE status = 'won'
              AND closed_at >= NOW() - make_interval(days => $2)
              AND ($1::uuid IS NULL OR manager_id = $1)
            GROUP BY DATE(closed_at)
            ORDER BY DATE(closed_at)
            "#,
        )
        .bind(owner)
        .bind(days)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    // 4. Funil: todas as etapas, mesmo as vazias
    pub async fn pipeline_snapshot(
        &self,
        owner: Option<Uuid>,
    ) -> Result<Vec<StageSnapshot>, AppError> {
        let stages = sqlx::query_as::<_, StageSnapshot>(
            r#"
            SELECT
                s.id AS stage_id,
                s.name AS stage_name,
                s.color,
                COUNT(d.id) AS count,
                COALESCE(SUM(d.amount), 0) AS amount
            FROM deal_stages s
            LEFT JOIN deals d
                ON d.stage_id = s.id
               AND d.status = 'open'
               AND ($1::uuid IS NULL OR d.manager_id = $1)
            GROUP BY s.id, s.name, s.color, s.sort_order
            ORDER BY s.sort_order, s.name
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(stages)
    }
}
