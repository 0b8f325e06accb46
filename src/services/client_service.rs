// src/services/client_service.rs

use uuid::Uuid;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    db::{ClientRepository, UserRepository},
    models::{
        auth::Caller,
        crm::{
            Client, ClientFilters, ClientStats, Contact, CreateClientPayload,
            CreateContactPayload, UpdateClientPayload, UpdateContactPayload,
        },
    },
    services::{access, user_service::ensure_user},
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    user_repo: UserRepository,
}

impl ClientService {
    pub fn new(repo: ClientRepository, user_repo: UserRepository) -> Self {
        Self { repo, user_repo }
    }

    // =========================================================================
    //  1. CLIENTES
    // =========================================================================

    pub async fn list(
        &self,
        caller: Caller,
        filters: &ClientFilters,
        page: Pagination,
    ) -> Result<Vec<Client>, AppError> {
        let owner = access::scope(caller).owner_filter();
        self.repo.list(owner, filters, page).await
    }

    pub async fn get(&self, caller: Caller, id: Uuid) -> Result<Client, AppError> {
        let client = self.repo.find_by_id(id).await?.ok_or(AppError::ResourceNotFound("Cliente"))?;
        access::ensure_visible(caller, &client)?;
        Ok(client)
    }

    pub async fn create(
        &self,
        caller: Caller,
        payload: &CreateClientPayload,
    ) -> Result<Client, AppError> {
        ensure_user(&self.user_repo, payload.manager_id).await?;

        let manager_id = access::owner_or_caller(caller, payload.manager_id);
        self.repo.create(payload, manager_id).await
    }

    pub async fn update(
        &self,
        caller: Caller,
        id: Uuid,
        payload: &UpdateClientPayload,
    ) -> Result<Client, AppError> {
        let mut client = self.get(caller, id).await?;
        ensure_user(&self.user_repo, payload.manager_id).await?;

        payload.apply_to(&mut client);
        self.repo.update(&client).await
    }

    pub async fn delete(&self, caller: Caller, id: Uuid) -> Result<(), AppError> {
        let client = self.repo.find_by_id(id).await?.ok_or(AppError::ResourceNotFound("Cliente"))?;
        access::ensure_can_delete(caller, &client)?;
        self.repo.delete(id).await?;

        tracing::info!("🗑️ Cliente {} removido (contatos e negócios em cascata)", id);
        Ok(())
    }

    pub async fn stats(&self, caller: Caller) -> Result<ClientStats, AppError> {
        self.repo.stats(access::scope(caller).owner_filter()).await
    }

    // =========================================================================
    //  2. CONTATOS (herdam a visibilidade do cliente)
    // =========================================================================

    pub async fn list_contacts(&self, caller: Caller, client_id: Uuid) -> Result<Vec<Contact>, AppError> {
        self.get(caller, client_id).await?;
        self.repo.list_contacts(client_id).await
    }

    pub async fn create_contact(
        &self,
        caller: Caller,
        client_id: Uuid,
        payload: &CreateContactPayload,
    ) -> Result<Contact, AppError> {
        self.get(caller, client_id).await?;

        let mut tx = self.repo.pool().begin().await?;
        if payload.is_primary {
            self.repo.clear_primary(&mut *tx, client_id, None).await?;
        }
        let contact = self.repo.create_contact(&mut *tx, client_id, payload).await?;
        tx.commit().await?;

        Ok(contact)
    }

    pub async fn update_contact(
        &self,
        caller: Caller,
        id: Uuid,
        payload: &UpdateContactPayload,
    ) -> Result<Contact, AppError> {
        let mut contact = self.find_contact(id).await?;
        self.get(caller, contact.client_id).await?;

        payload.apply_to(&mut contact);

        let mut tx = self.repo.pool().begin().await?;
        if payload.is_primary == Some(true) {
            self.repo.clear_primary(&mut *tx, contact.client_id, Some(contact.id)).await?;
        }
        let updated = self.repo.update_contact(&mut *tx, &contact).await?;
        tx.commit().await?;

        Ok(updated)
    }

    pub async fn delete_contact(&self, caller: Caller, id: Uuid) -> Result<(), AppError> {
        let contact = self.find_contact(id).await?;
        let client = self
            .repo
            .find_by_id(contact.client_id)
            .await?
            .ok_or(AppError::ResourceNotFound("Cliente"))?;
        access::ensure_can_delete(caller, &client)?;

        self.repo.delete_contact(id).await
    }

    async fn find_contact(&self, id: Uuid) -> Result<Contact, AppError> {
        self.repo.find_contact(id).await?.ok_or(AppError::ResourceNotFound("Contato"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::PgPool;

    use crate::{
        models::auth::Role,
        test_support::{self, payload},
    };

    #[sqlx::test]
    async fn manager_cannot_reach_another_managers_client(pool: PgPool) {
        let state = test_support::state(pool.clone());
        let admin = test_support::user(&pool, "admin", Role::Admin).await;
        let m1 = test_support::user(&pool, "m1", Role::Manager).await;
        let m2 = test_support::user(&pool, "m2", Role::Manager).await;

        let service = &state.client_service;
        let x = test_support::client(&state, m1, "X").await;
        assert_eq!(x.manager_id, Some(m1.id));

        let err = service.get(m2, x.id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
        let err = service
            .update(m2, x.id, &payload(json!({ "name": "Y" })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
        let err = service.delete(m2, x.id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
        let err = service.list_contacts(m2, x.id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));

        let visible = service.list(m2, &Default::default(), Pagination::default()).await.unwrap();
        assert!(visible.is_empty());

        assert_eq!(service.get(m1, x.id).await.unwrap().name, "X");
        assert_eq!(service.get(admin, x.id).await.unwrap().name, "X");
    }

    #[sqlx::test]
    async fn unknown_manager_is_not_found(pool: PgPool) {
        let state = test_support::state(pool.clone());
        let admin = test_support::user(&pool, "admin", Role::Admin).await;
        let service = &state.client_service;

        let err = service
            .create(admin, &payload(json!({ "name": "Acme", "manager_id": Uuid::new_v4() })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound("Usuário")));

        let client = test_support::client(&state, admin, "Acme").await;
        let err = service
            .update(admin, client.id, &payload(json!({ "manager_id": Uuid::new_v4() })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound("Usuário")));
        assert_eq!(service.get(admin, client.id).await.unwrap().manager_id, Some(admin.id));
    }
}
