// src/db/user_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{map_unique_violation, Pagination},
        error::AppError,
    },
    models::auth::{Role, User, UserFilters},
};

const USER_COLUMNS: &str = r#"
    id, email, username, full_name, password_hash, role, is_active,
    phone, position, avatar_url, last_login, created_at, updated_at
"#;

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

/// Dados já validados e com a senha em hash.
pub struct NewUser<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub full_name: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub phone: Option<&'a str>,
    pub position: Option<&'a str>,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let maybe_user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }

    // O login aceita tanto o nome de usuário quanto o e-mail
    pub async fn find_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1 LIMIT 1"
        );
        let maybe_user = sqlx::query_as::<_, User>(&sql)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn list(
        &self,
        filters: &UserFilters,
        page: Pagination,
    ) -> Result<Vec<User>, AppError> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::user_role IS NULL OR role = $1)
              AND ($2::boolean IS NULL OR is_active = $2)
            ORDER BY created_at DESC
            OFFSET $3 LIMIT $4
            "#
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(filters.role)
            .bind(filters.is_active)
            .bind(page.offset())
            .bind(page.limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    // Com tratamento de erro específico para e-mail/usuário duplicados.
    pub async fn create(&self, new_user: NewUser<'_>) -> Result<User, AppError> {
        let sql = format!(
            r#"
            INSERT INTO users (email, username, full_name, password_hash, role, phone, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(new_user.email)
            .bind(new_user.username)
            .bind(new_user.full_name)
            .bind(new_user.password_hash)
            .bind(new_user.role)
            .bind(new_user.phone)
            .bind(new_user.position)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;
        Ok(user)
    }

    /// Grava o estado completo do usuário (o patch já foi aplicado no serviço).
    pub async fn update(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            r#"
            UPDATE users
            SET email = $2, full_name = $3, password_hash = $4, role = $5, is_active = $6,
                phone = $7, position = $8, avatar_url = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(user.is_active)
            .bind(&user.phone)
            .bind(&user.position)
            .bind(&user.avatar_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)?
            .ok_or(AppError::ResourceNotFound("Usuário"))?;
        Ok(updated)
    }

    pub async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
