// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Tipo de erro único da aplicação. Cada variante vira um status HTTP em `into_response`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Valor duplicado: {0}")]
    UniqueConstraintViolation(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário inativo")]
    InactiveUser,

    #[error("Permissões insuficientes")]
    PermissionDenied,

    #[error("Não encontrado: {0}")]
    ResourceNotFound(&'static str),

    // Conflito: a etapa ainda é referenciada por negócios
    #[error("A etapa possui {0} negócio(s) vinculados")]
    StageHasDeals(i64),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` captura o contexto de falhas inesperadas.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidInput(_)
            | AppError::StageHasDeals(_) => StatusCode::BAD_REQUEST,
            AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::InactiveUser | AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::InvalidInput(msg) => msg,
            AppError::UniqueConstraintViolation(msg) => msg,
            AppError::InvalidCredentials => "Usuário ou senha incorretos.".to_string(),
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.".to_string(),
            AppError::InactiveUser => "Usuário inativo.".to_string(),
            AppError::PermissionDenied => "Permissões insuficientes.".to_string(),
            AppError::ResourceNotFound(what) => format!("Não encontrado: {}.", what),
            AppError::StageHasDeals(count) => {
                format!("Não é possível excluir a etapa: {} negócio(s) ainda estão nela.", count)
            }

            // Banco, hashing, JWT e internos viram 500.
            // O `tracing` registra a mensagem detalhada que `thiserror` montou.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_http_status() {
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::PermissionDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::ResourceNotFound("Negócio").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::StageHasDeals(3).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::UniqueConstraintViolation("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn stage_conflict_reports_blocking_count() {
        let msg = AppError::StageHasDeals(4).to_string();
        assert!(msg.contains('4'));
    }

    #[test]
    fn response_keeps_status() {
        let response = AppError::ResourceNotFound("Cliente").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
