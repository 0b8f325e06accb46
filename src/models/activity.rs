// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "activity_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Call,
    Email,
    Meeting,
    Note,
    Whatsapp,
    Telegram,
}

// Histórico de interações. Somente inserção: nunca é editado nem apagado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Activity {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub deal_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    // Autor
    pub user_id: Uuid,
    pub subject: Option<String>,
    pub content: Option<String>,
    // Duração em segundos (ligações/reuniões)
    pub duration: Option<i32>,
    pub activity_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Linha a ser inserida, montada pelos serviços.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub kind: ActivityType,
    pub deal_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub user_id: Uuid,
    pub subject: Option<String>,
    pub content: Option<String>,
    pub duration: Option<i32>,
    pub activity_date: DateTime<Utc>,
}

impl NewActivity {
    /// Nota automática do sistema ligada a um negócio.
    pub fn deal_note(
        deal_id: Uuid,
        client_id: Uuid,
        author_id: Uuid,
        subject: &str,
        content: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: ActivityType::Note,
            deal_id: Some(deal_id),
            client_id: Some(client_id),
            user_id: author_id,
            subject: Some(subject.to_string()),
            content: Some(content),
            duration: None,
            activity_date: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateActivityPayload {
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub deal_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub subject: Option<String>,
    pub content: Option<String>,
    #[validate(range(min = 0, message = "A duração não pode ser negativa."))]
    pub duration: Option<i32>,
    pub activity_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityFilters {
    pub deal_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: Option<ActivityType>,
}
