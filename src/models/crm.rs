// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Mapeia o CREATE TYPE client_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Lead,
    Client,
    Archive,
}

// --- CLIENTE (a empresa) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Client {
    pub id: Uuid,

    #[schema(example = "Acme Ltda")]
    pub name: String,
    #[schema(example = "7701234567")]
    pub tax_id: Option<String>,
    pub website: Option<String>,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,

    // Origem: anúncio, redes sociais, indicação...
    #[schema(example = "indicação")]
    pub source: Option<String>,
    pub status: ClientStatus,

    // Gerente responsável (dono do registro)
    pub manager_id: Option<Uuid>,
    pub notes: Option<String>,

    pub last_contact: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClientPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Acme Ltda")]
    pub name: String,
    pub tax_id: Option<String>,
    pub website: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub source: Option<String>,
    pub status: Option<ClientStatus>,
    // Se não vier, o criador vira o responsável
    pub manager_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClientPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub website: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub source: Option<String>,
    pub status: Option<ClientStatus>,
    pub manager_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl UpdateClientPayload {
    // Só os campos enviados são alterados
    pub fn apply_to(&self, client: &mut Client) {
        if let Some(name) = &self.name {
            client.name = name.clone();
        }
        if self.tax_id.is_some() {
            client.tax_id = self.tax_id.clone();
        }
        if self.website.is_some() {
            client.website = self.website.clone();
        }
        if self.email.is_some() {
            client.email = self.email.clone();
        }
        if self.phone.is_some() {
            client.phone = self.phone.clone();
        }
        if self.address.is_some() {
            client.address = self.address.clone();
        }
        if self.source.is_some() {
            client.source = self.source.clone();
        }
        if let Some(status) = self.status {
            client.status = status;
        }
        if self.manager_id.is_some() {
            client.manager_id = self.manager_id;
        }
        if self.notes.is_some() {
            client.notes = self.notes.clone();
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientFilters {
    pub status: Option<ClientStatus>,
    // Busca por nome, e-mail ou documento
    pub search: Option<String>,
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ClientStats {
    pub total: i64,
    pub leads: i64,
    pub clients: i64,
    pub archived: i64,
}

// --- CONTATO (a pessoa dentro do cliente) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Contact {
    pub id: Uuid,
    pub client_id: Uuid,
    #[schema(example = "João Pereira")]
    pub name: String,
    #[schema(example = "Diretor Comercial")]
    pub position: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub telegram: Option<String>,
    pub whatsapp: Option<String>,
    pub notes: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateContactPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub position: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub phone: String,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub telegram: Option<String>,
    pub whatsapp: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateContactPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub position: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub phone: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub telegram: Option<String>,
    pub whatsapp: Option<String>,
    pub notes: Option<String>,
    pub is_primary: Option<bool>,
}

impl UpdateContactPayload {
    pub fn apply_to(&self, contact: &mut Contact) {
        if let Some(name) = &self.name {
            contact.name = name.clone();
        }
        if self.position.is_some() {
            contact.position = self.position.clone();
        }
        if let Some(phone) = &self.phone {
            contact.phone = phone.clone();
        }
        if self.email.is_some() {
            contact.email = self.email.clone();
        }
        if self.telegram.is_some() {
            contact.telegram = self.telegram.clone();
        }
        if self.whatsapp.is_some() {
            contact.whatsapp = self.whatsapp.clone();
        }
        if self.notes.is_some() {
            contact.notes = self.notes.clone();
        }
        if let Some(is_primary) = self.is_primary {
            contact.is_primary = is_primary;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_client() -> Client {
        let now = Utc::now();
        Client {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            tax_id: Some("123".into()),
            website: None,
            email: None,
            phone: None,
            address: None,
            source: None,
            status: ClientStatus::Lead,
            manager_id: Some(Uuid::new_v4()),
            notes: Some("antigo".into()),
            last_contact: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn update_touches_only_sent_fields() {
        let mut client = sample_client();
        let owner = client.manager_id;

        let patch: UpdateClientPayload =
            serde_json::from_str(r#"{"status": "client", "email": "c@acme.com"}"#).unwrap();
        patch.apply_to(&mut client);

        assert_eq!(client.status, ClientStatus::Client);
        assert_eq!(client.email.as_deref(), Some("c@acme.com"));
        assert_eq!(client.name, "Acme");
        assert_eq!(client.tax_id.as_deref(), Some("123"));
        assert_eq!(client.notes.as_deref(), Some("antigo"));
        assert_eq!(client.manager_id, owner);
    }

    #[test]
    fn status_uses_lowercase_wire_names() {
        let status: ClientStatus = serde_json::from_str(r#""archive""#).unwrap();
        assert_eq!(status, ClientStatus::Archive);
        assert_eq!(serde_json::to_string(&ClientStatus::Lead).unwrap(), r#""lead""#);
    }
}
