// src/models/pipeline.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Structs de Configuração ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Pipeline {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Funil Principal")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 0)]
    pub sort_order: i32,
    #[schema(example = true)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DealStage {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440001")]
    pub id: Uuid,
    pub pipeline_id: Uuid,
    #[schema(example = "Negociação")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "#F59E0B")]
    pub color: String,
    #[schema(example = 3)]
    pub sort_order: i32,
    // Probabilidade de fechamento (0-100)
    #[schema(example = 75)]
    pub win_probability: i32,
    // Etapa terminal? `is_won` diferencia ganho de perda.
    pub is_final: bool,
    pub is_won: bool,
    pub created_at: DateTime<Utc>,
}

// Funil com as etapas já ordenadas
#[derive(Debug, Serialize, ToSchema)]
pub struct PipelineDetail {
    #[serde(flatten)]
    pub pipeline: Pipeline,
    pub stages: Vec<DealStage>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePipelinePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Vendas no Atacado")]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePipelinePayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdatePipelinePayload {
    pub fn apply_to(&self, pipeline: &mut Pipeline) {
        if let Some(name) = &self.name {
            pipeline.name = name.clone();
        }
        if self.description.is_some() {
            pipeline.description = self.description.clone();
        }
        if let Some(sort_order) = self.sort_order {
            pipeline.sort_order = sort_order;
        }
        if let Some(is_active) = self.is_active {
            pipeline.is_active = is_active;
        }
    }
}

pub const DEFAULT_STAGE_COLOR: &str = "#3B82F6";

fn default_color() -> String {
    DEFAULT_STAGE_COLOR.to_string()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStagePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Qualificação")]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_color")]
    #[schema(example = "#3B82F6")]
    pub color: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "A probabilidade deve estar entre 0 e 100."))]
    pub win_probability: i32,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_won: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStagePayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i32>,
    #[validate(range(min = 0, max = 100, message = "A probabilidade deve estar entre 0 e 100."))]
    pub win_probability: Option<i32>,
    pub is_final: Option<bool>,
    pub is_won: Option<bool>,
}

impl UpdateStagePayload {
    pub fn apply_to(&self, stage: &mut DealStage) {
        if let Some(name) = &self.name {
            stage.name = name.clone();
        }
        if self.description.is_some() {
            stage.description = self.description.clone();
        }
        if let Some(color) = &self.color {
            stage.color = color.clone();
        }
        if let Some(sort_order) = self.sort_order {
            stage.sort_order = sort_order;
        }
        if let Some(win_probability) = self.win_probability {
            stage.win_probability = win_probability;
        }
        if let Some(is_final) = self.is_final {
            stage.is_final = is_final;
        }
        if let Some(is_won) = self.is_won {
            stage.is_won = is_won;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn stage_payload_defaults() {
        let payload: CreateStagePayload = serde_json::from_str(r#"{"name": "Novo lead"}"#).unwrap();
        assert_eq!(payload.color, DEFAULT_STAGE_COLOR);
        assert_eq!(payload.win_probability, 0);
        assert!(!payload.is_final);
        assert!(!payload.is_won);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn win_probability_must_be_a_percentage() {
        let payload: CreateStagePayload =
            serde_json::from_str(r#"{"name": "Ganho", "win_probability": 120}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("win_probability"));

        let patch = UpdateStagePayload { win_probability: Some(-1), ..Default::default() };
        assert!(patch.validate().is_err());
    }
}
