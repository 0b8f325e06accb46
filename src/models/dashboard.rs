// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// 1. Cards do topo (já filtrados pelo escopo do usuário)
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub deals: DealCounts,
    pub revenue: Revenue,
    pub clients: ClientCounts,
    pub tasks: TaskCounts,
    // won / total * 100, uma casa decimal
    #[schema(example = 33.3)]
    pub conversion_rate: f64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct DealCounts {
    pub total: i64,
    pub open: i64,
    pub won: i64,
    pub lost: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct Revenue {
    pub total: Decimal,
    pub month: Decimal,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ClientCounts {
    pub total: i64,
    pub leads: i64,
    pub clients: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TaskCounts {
    pub total: i64,
    pub pending: i64,
    pub completed: i64,
}

impl DealCounts {
    pub fn conversion_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let rate = self.won as f64 / self.total as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    }
}

// 2. Gráfico de vendas (negócios ganhos por dia de fechamento)
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct SalesChartEntry {
    #[schema(example = "2025-05-14")]
    pub date: Option<String>,
    pub count: i64,
    pub amount: Decimal,
}

// 3. Fotografia do funil por etapa
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct StageSnapshot {
    pub stage_id: Uuid,
    pub stage_name: String,
    pub color: String,
    pub count: i64,
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentActivitiesQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SalesChartQuery {
    pub days: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_rate_rounds_to_one_decimal() {
        let counts = DealCounts { total: 3, open: 1, won: 1, lost: 1 };
        assert_eq!(counts.conversion_rate(), 33.3);
    }

    #[test]
    fn conversion_rate_without_deals_is_zero() {
        let counts = DealCounts { total: 0, open: 0, won: 0, lost: 0 };
        assert_eq!(counts.conversion_rate(), 0.0);
    }
}
