// src/handlers/crm.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::crm::{
        Client, ClientFilters, ClientStats, Contact, CreateClientPayload, CreateContactPayload,
        UpdateClientPayload, UpdateContactPayload,
    },
};

// =============================================================================
//  ÁREA 1: CLIENTES
// =============================================================================

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    params(ClientFilters, Pagination),
    responses(
        (status = 200, description = "Clientes visíveis para o usuário", body = Vec<Client>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(filters): Query<ClientFilters>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let clients = app_state.client_service.list(user.caller(), &filters, page).await?;
    Ok((StatusCode::OK, Json(clients)))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state.client_service.create(user.caller(), &payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/clients/stats/summary
#[utoipa::path(
    get,
    path = "/api/clients/stats/summary",
    tag = "Clients",
    responses(
        (status = 200, description = "Totais por status", body = ClientStats)
    ),
    security(("api_jwt" = []))
)]
pub async fn client_stats(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.client_service.stats(user.caller()).await?;
    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Client),
        (status = 403, description = "Fora do escopo do usuário"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.client_service.get(user.caller(), id).await?;
    Ok((StatusCode::OK, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = UpdateClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 403, description = "Fora do escopo do usuário"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state.client_service.update(user.caller(), id, &payload).await?;
    Ok((StatusCode::OK, Json(client)))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente removido"),
        (status = 403, description = "Apenas admin ou o gerente responsável"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.client_service.delete(user.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: CONTATOS
// =============================================================================

// GET /api/clients/{id}/contacts
#[utoipa::path(
    get,
    path = "/api/clients/{id}/contacts",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Contatos do cliente", body = Vec<Contact>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contacts(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let contacts = app_state.client_service.list_contacts(user.caller(), client_id).await?;
    Ok((StatusCode::OK, Json(contacts)))
}

// POST /api/clients/{id}/contacts
#[utoipa::path(
    post,
    path = "/api/clients/{id}/contacts",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = CreateContactPayload,
    responses(
        (status = 201, description = "Contato criado", body = Contact),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contact(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<CreateContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let contact = app_state
        .client_service
        .create_contact(user.caller(), client_id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

// PUT /api/contacts/{id}
#[utoipa::path(
    put,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "ID do contato")),
    request_body = UpdateContactPayload,
    responses(
        (status = 200, description = "Contato atualizado", body = Contact),
        (status = 404, description = "Contato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contact(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let contact = app_state.client_service.update_contact(user.caller(), id, &payload).await?;
    Ok((StatusCode::OK, Json(contact)))
}

// DELETE /api/contacts/{id}
#[utoipa::path(
    delete,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "ID do contato")),
    responses(
        (status = 204, description = "Contato removido"),
        (status = 404, description = "Contato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contact(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.client_service.delete_contact(user.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
