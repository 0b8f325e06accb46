use serde::Deserialize;
use utoipa::IntoParams;

use crate::common::error::AppError;

pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 500;

// ---
// Paginação: `?offset=0&limit=100` (o front antigo ainda envia `skip`)
// ---
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    #[serde(alias = "skip")]
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

/// Converte violação de UNIQUE em erro amigável; o resto segue como erro de banco.
pub(crate) fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_email_key") => {
                    AppError::UniqueConstraintViolation("Este e-mail já está em uso.".into())
                }
                Some("users_username_key") => {
                    AppError::UniqueConstraintViolation("Este nome de usuário já está em uso.".into())
                }
                Some(other) => AppError::UniqueConstraintViolation(other.to_string()),
                None => AppError::UniqueConstraintViolation("registro duplicado".into()),
            };
        }
    }
    e.into()
}

/// Transforma `Some("")` em `None` para filtros de texto vindos da query string.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let p = Pagination::default();
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), DEFAULT_PAGE_SIZE);

        let p = Pagination { offset: Some(-5), limit: Some(10_000) };
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), MAX_PAGE_SIZE);

        let p = Pagination { offset: Some(20), limit: Some(0) };
        assert_eq!(p.offset(), 20);
        assert_eq!(p.limit(), 1);
    }

    #[test]
    fn skip_is_accepted_as_offset() {
        let p: Pagination = serde_json::from_str(r#"{"skip": 40, "limit": 20}"#).unwrap();
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn blank_filters_are_ignored() {
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some(" acme ")), Some("acme"));
        assert_eq!(non_empty(None), None);
    }
}
