// src/db/client_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{non_empty, Pagination},
        error::AppError,
    },
    models::crm::{
        Client, ClientFilters, ClientStats, ClientStatus, Contact, CreateClientPayload,
        CreateContactPayload,
    },
};

const CLIENT_COLUMNS: &str = r#"
    id, name, tax_id, website, email, phone, address, source, status,
    manager_id, notes, last_contact, created_at, updated_at
"#;

const CONTACT_COLUMNS: &str = r#"
    id, client_id, name, position, phone, email, telegram, whatsapp, notes, is_primary, created_at
"#;

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }

    /// `owner` vem da política de acesso: quando presente, só os clientes daquele gerente.
    pub async fn list(
        &self,
        owner: Option<Uuid>,
        filters: &ClientFilters,
        page: Pagination,
    ) -> Result<Vec<Client>, AppError> {
        let search = non_empty(filters.search.as_deref()).map(|term| format!("%{term}%"));

        let sql = format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE ($1::uuid IS NULL OR manager_id = $1)
              AND ($2::client_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR manager_id = $3)
              AND ($4::text IS NULL OR name ILIKE $4 OR email ILIKE $4 OR tax_id ILIKE $4)
            ORDER BY created_at DESC
            OFFSET $5 LIMIT $6
            "#
        );
        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(owner)
            .bind(filters.status)
            .bind(filters.manager_id)
            .bind(search)
            .bind(page.offset())
            .bind(page.limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(clients)
    }

    pub async fn create(
        &self,
        payload: &CreateClientPayload,
        manager_id: Uuid,
    ) -> Result<Client, AppError> {
        let sql = format!(
            r#"
            INSERT INTO clients (
                name, tax_id, website, email, phone, address, source, status, manager_id, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CLIENT_COLUMNS}
            "#
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(&payload.name)
            .bind(&payload.tax_id)
            .bind(&payload.website)
            .bind(&payload.email)
            .bind(&payload.phone)
            .bind(&payload.address)
            .bind(&payload.source)
            .bind(payload.status.unwrap_or(ClientStatus::Lead))
            .bind(manager_id)
            .bind(&payload.notes)
            .fetch_one(&self.pool)
            .await?;
        Ok(client)
    }

    pub async fn update(&self, client: &Client) -> Result<Client, AppError> {
        let sql = format!(
            r#"
            UPDATE clients
            SET name = $2, tax_id = $3, website = $4, email = $5, phone = $6, address = $7,
                source = $8, status = $9, manager_id = $10, notes = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Client>(&sql)
            .bind(client.id)
            .bind(&client.name)
            .bind(&client.tax_id)
            .bind(&client.website)
            .bind(&client.email)
            .bind(&client.phone)
            .bind(&client.address)
            .bind(&client.source)
            .bind(client.status)
            .bind(client.manager_id)
            .bind(&client.notes)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::ResourceNotFound("Cliente"))?;
        Ok(updated)
    }

    // Contatos, negócios (e, em cascata, suas tarefas/atividades) saem junto pelo banco
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound("Cliente"));
        }
        Ok(())
    }

    pub async fn stats(&self, owner: Option<Uuid>) -> Result<ClientStats, AppError> {
        let stats = sqlx::query_as::<_, ClientStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'lead') AS leads,
                COUNT(*) FILTER (WHERE status = 'client') AS clients,
                COUNT(*) FILTER (WHERE status = 'archive') AS archived
            FROM clients
            WHERE ($1::uuid IS NULL OR manager_id = $1)
            "#,
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    // =========================================================================
    //  CONTATOS
    // =========================================================================

    pub async fn find_contact(&self, id: Uuid) -> Result<Option<Contact>, AppError> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1");
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    // Contato principal primeiro
    pub async fn list_contacts(&self, client_id: Uuid) -> Result<Vec<Contact>, AppError> {
        let sql = format!(
            r#"
            SELECT {CONTACT_COLUMNS}
            FROM contacts
            WHERE client_id = $1
            ORDER BY is_primary DESC, created_at ASC
            "#
        );
        let contacts = sqlx::query_as::<_, Contact>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(contacts)
    }

    /// Desmarca o contato principal dos demais contatos do cliente.
    pub async fn clear_primary<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        except: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE contacts SET is_primary = FALSE
            WHERE client_id = $1 AND is_primary AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(client_id)
        .bind(except)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn create_contact<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        payload: &CreateContactPayload,
    ) -> Result<Contact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO contacts (
                client_id, name, position, phone, email, telegram, whatsapp, notes, is_primary
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CONTACT_COLUMNS}
            "#
        );
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(client_id)
            .bind(&payload.name)
            .bind(&payload.position)
            .bind(&payload.phone)
            .bind(&payload.email)
            .bind(&payload.telegram)
            .bind(&payload.whatsapp)
            .bind(&payload.notes)
            .bind(payload.is_primary)
            .fetch_one(executor)
            .await?;
        Ok(contact)
    }

    pub async fn update_contact<'e, E>(
        &self,
        executor: E,
        contact: &Contact,
    ) -> Result<Contact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE contacts
            SET name = $2, position = $3, phone = $4, email = $5, telegram = $6,
                whatsapp = $7, notes = $8, is_primary = $9
            WHERE id = $1
            RETURNING {CONTACT_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Contact>(&sql)
            .bind(contact.id)
            .bind(&contact.name)
            .bind(&contact.position)
            .bind(&contact.phone)
            .bind(&contact.email)
            .bind(&contact.telegram)
            .bind(&contact.whatsapp)
            .bind(&contact.notes)
            .bind(contact.is_primary)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ResourceNotFound("Contato"))?;
        Ok(updated)
    }

    pub async fn delete_contact(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound("Contato"));
        }
        Ok(())
    }
}
