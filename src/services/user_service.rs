// src/services/user_service.rs

use uuid::Uuid;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    db::{user_repo::NewUser, UserRepository},
    models::auth::{
        AdminUpdateUserPayload, Caller, CreateUserPayload, UpdateProfilePayload, User,
        UserFilters,
    },
    services::{access, auth::hash_password},
};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        caller: Caller,
        filters: &UserFilters,
        page: Pagination,
    ) -> Result<Vec<User>, AppError> {
        access::ensure_admin(caller)?;
        self.repo.list(filters, page).await
    }

    pub async fn get(&self, caller: Caller, id: Uuid) -> Result<User, AppError> {
        access::ensure_admin(caller)?;
        self.repo.find_by_id(id).await?.ok_or(AppError::ResourceNotFound("Usuário"))
    }

    pub async fn create(&self, caller: Caller, payload: &CreateUserPayload) -> Result<User, AppError> {
        access::ensure_admin(caller)?;
        self.register(payload).await
    }

    /// Criação sem checagem de papel; usada também pelo `create-admin` da CLI.
    pub async fn register(&self, payload: &CreateUserPayload) -> Result<User, AppError> {
        let password_hash = hash_password(&payload.password).await?;
        let user = self
            .repo
            .create(NewUser {
                email: &payload.email,
                username: &payload.username,
                full_name: &payload.full_name,
                password_hash: &password_hash,
                role: payload.role,
                phone: payload.phone.as_deref(),
                position: payload.position.as_deref(),
            })
            .await?;

        tracing::info!("👤 Usuário '{}' criado ({:?})", user.username, user.role);
        Ok(user)
    }

    // PUT /api/auth/me
    pub async fn update_profile(
        &self,
        mut user: User,
        payload: &UpdateProfilePayload,
    ) -> Result<User, AppError> {
        payload.apply_to(&mut user);
        if let Some(password) = &payload.password {
            user.password_hash = hash_password(password).await?;
        }
        self.repo.update(&user).await
    }

    // PUT /api/users/{id}
    pub async fn admin_update(
        &self,
        caller: Caller,
        id: Uuid,
        payload: &AdminUpdateUserPayload,
    ) -> Result<User, AppError> {
        access::ensure_admin(caller)?;
        let mut user = self.repo.find_by_id(id).await?.ok_or(AppError::ResourceNotFound("Usuário"))?;

        payload.apply_to(&mut user);
        if let Some(password) = &payload.password {
            user.password_hash = hash_password(password).await?;
        }
        self.repo.update(&user).await
    }
}

/// Responsável informado (gerente ou executor) precisa existir.
pub(crate) async fn ensure_user(users: &UserRepository, id: Option<Uuid>) -> Result<(), AppError> {
    match id {
        Some(id) if !users.exists(id).await? => Err(AppError::ResourceNotFound("Usuário")),
        _ => Ok(()),
    }
}
