// src/models/deal.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- Enums ---

// Mapeia o CREATE TYPE deal_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "deal_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DealStatus {
    Open,
    Won,
    Lost,
}

// --- Negócio: a entidade central do CRM ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Deal {
    pub id: Uuid,
    #[schema(example = "Campanha de verão")]
    pub title: String,
    pub description: Option<String>,

    pub client_id: Uuid,
    pub pipeline_id: Uuid,
    pub stage_id: Uuid,
    pub manager_id: Option<Uuid>,

    #[schema(example = "1000.00")]
    pub amount: Decimal,
    #[schema(example = "RUB")]
    pub currency: String,

    #[schema(value_type = Option<String>, format = Date, example = "2025-06-30")]
    pub expected_close_date: Option<NaiveDate>,
    // Carimbado quando o negócio entra numa etapa final
    pub closed_at: Option<DateTime<Utc>>,

    pub status: DealStatus,
    pub lost_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDealPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Campanha de verão")]
    pub title: String,
    pub description: Option<String>,

    pub client_id: Uuid,
    pub pipeline_id: Uuid,
    pub stage_id: Uuid,
    // Se não vier, o criador vira o responsável
    pub manager_id: Option<Uuid>,

    #[serde(default)]
    #[schema(example = "1000.00")]
    pub amount: Decimal,
    #[validate(length(equal = 3, message = "invalid_currency"))]
    #[schema(example = "RUB")]
    pub currency: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2025-06-30")]
    pub expected_close_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDealPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub client_id: Option<Uuid>,
    pub stage_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    #[validate(length(equal = 3, message = "invalid_currency"))]
    pub currency: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub expected_close_date: Option<NaiveDate>,
    // Override explícito de status (fora da regra de movimentação)
    pub status: Option<DealStatus>,
    pub lost_reason: Option<String>,
}

impl UpdateDealPayload {
    /// Copia os campos simples. Status/closed_at ficam com `apply_status_override`.
    pub fn apply_fields(&self, deal: &mut Deal) {
        if let Some(title) = &self.title {
            deal.title = title.clone();
        }
        if self.description.is_some() {
            deal.description = self.description.clone();
        }
        if let Some(client_id) = self.client_id {
            deal.client_id = client_id;
        }
        if let Some(stage_id) = self.stage_id {
            deal.stage_id = stage_id;
        }
        if self.manager_id.is_some() {
            deal.manager_id = self.manager_id;
        }
        if let Some(amount) = self.amount {
            deal.amount = amount;
        }
        if let Some(currency) = &self.currency {
            deal.currency = currency.clone();
        }
        if self.expected_close_date.is_some() {
            deal.expected_close_date = self.expected_close_date;
        }
        if self.lost_reason.is_some() {
            deal.lost_reason = self.lost_reason.clone();
        }
    }
}

// Movimentação no Kanban
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MoveDealPayload {
    pub stage_id: Uuid,
    // Motivo (gravado como lost_reason quando a etapa é de perda)
    #[schema(example = "Preço acima do orçamento")]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DealFilters {
    pub pipeline_id: Option<Uuid>,
    pub stage_id: Option<Uuid>,
    pub status: Option<DealStatus>,
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PipelineStatsQuery {
    pub pipeline_id: Uuid,
}

// Cartão resumido do Kanban
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DealCard {
    pub id: Uuid,
    #[serde(skip)]
    #[schema(ignore)]
    pub stage_id: Uuid,
    pub title: String,
    pub amount: Decimal,
    pub client_id: Uuid,
}

// Uma coluna do Kanban: a etapa e os negócios abertos nela
#[derive(Debug, Serialize, ToSchema)]
pub struct StageColumn {
    pub stage_id: Uuid,
    pub stage_name: String,
    pub color: String,
    pub deals_count: i64,
    pub total_amount: Decimal,
    pub deals: Vec<DealCard>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_payload_and_board_query_use_snake_case() {
        let stage_id = Uuid::new_v4();
        let payload: MoveDealPayload = serde_json::from_value(serde_json::json!({
            "stage_id": stage_id,
            "reason": "Sem orçamento"
        }))
        .unwrap();
        assert_eq!(payload.stage_id, stage_id);
        assert_eq!(payload.reason.as_deref(), Some("Sem orçamento"));

        let query: PipelineStatsQuery =
            serde_json::from_value(serde_json::json!({ "pipeline_id": stage_id })).unwrap();
        assert_eq!(query.pipeline_id, stage_id);
    }

    #[test]
    fn board_column_serializes_like_the_kanban_expects() {
        let column = StageColumn {
            stage_id: Uuid::new_v4(),
            stage_name: "Proposta".into(),
            color: "#8B5CF6".into(),
            deals_count: 1,
            total_amount: Decimal::new(1500, 0),
            deals: vec![DealCard {
                id: Uuid::new_v4(),
                stage_id: Uuid::new_v4(),
                title: "Campanha".into(),
                amount: Decimal::new(1500, 0),
                client_id: Uuid::new_v4(),
            }],
        };

        let value = serde_json::to_value(&column).unwrap();
        for key in ["stage_id", "stage_name", "color", "deals_count", "total_amount", "deals"] {
            assert!(value.get(key).is_some(), "{key}");
        }
        let card = &value["deals"][0];
        assert!(card.get("client_id").is_some());
        assert!(card.get("stage_id").is_none());
        assert_eq!(value["total_amount"], serde_json::json!(1500.0));
    }
}
