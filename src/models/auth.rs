// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    #[schema(example = "ana@empresa.com")]
    pub email: String,
    #[schema(example = "ana")]
    pub username: String,
    #[schema(example = "Ana Souza")]
    pub full_name: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Role,
    pub is_active: bool,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub avatar_url: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Identidade mínima usada pela política de acesso.
    pub fn caller(&self) -> Caller {
        Caller { id: self.id, role: self.role }
    }
}

/// Quem está fazendo a requisição.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

// Dados para login. `username` aceita o nome de usuário ou o e-mail.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "admin")]
    pub username: String,
    #[validate(length(min = 1, message = "required"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

// Criação de usuário (admin ou CLI de bootstrap)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 3, max = 64, message = "O nome de usuário deve ter entre 3 e 64 caracteres."))]
    pub username: String,
    #[validate(length(min = 1, message = "required"))]
    pub full_name: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
    pub phone: Option<String>,
    pub position: Option<String>,
}

fn default_role() -> Role {
    Role::Employee
}

// Auto-edição (PUT /api/auth/me): papel e ativação ficam de fora
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfilePayload {
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub avatar_url: Option<String>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
}

// Edição administrativa (PUT /api/users/{id})
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AdminUpdateUserPayload {
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
}

impl UpdateProfilePayload {
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(full_name) = &self.full_name {
            user.full_name = full_name.clone();
        }
        if self.phone.is_some() {
            user.phone = self.phone.clone();
        }
        if self.position.is_some() {
            user.position = self.position.clone();
        }
        if self.avatar_url.is_some() {
            user.avatar_url = self.avatar_url.clone();
        }
    }
}

impl AdminUpdateUserPayload {
    pub fn apply_to(&self, user: &mut User) {
        UpdateProfilePayload {
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            position: self.position.clone(),
            avatar_url: self.avatar_url.clone(),
            password: None,
        }
        .apply_to(user);

        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilters {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}
