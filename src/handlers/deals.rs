// src/handlers/deals.rs

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
    models::deal::{
        CreateDealPayload, Deal, DealFilters, MoveDealPayload, PipelineStatsQuery, StageColumn,
        UpdateDealPayload,
    },
};

// GET /api/deals
#[utoipa::path(
    get,
    path = "/api/deals",
    tag = "Deals",
    params(DealFilters, Pagination),
    responses(
        (status = 200, description = "Negócios visíveis para o usuário", body = Vec<Deal>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_deals(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(filters): Query<DealFilters>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let deals = app_state.deal_service.list(user.caller(), &filters, page).await?;
    Ok((StatusCode::OK, Json(deals)))
}

// POST /api/deals
#[utoipa::path(
    post,
    path = "/api/deals",
    tag = "Deals",
    request_body = CreateDealPayload,
    responses(
        (status = 201, description = "Negócio criado", body = Deal),
        (status = 400, description = "Dados inválidos ou etapa de outro funil"),
        (status = 404, description = "Cliente, funil ou etapa não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_deal(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateDealPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let deal = app_state.deal_service.create(user.caller(), &payload).await?;
    Ok((StatusCode::CREATED, Json(deal)))
}

// GET /api/deals/stats/pipeline?pipeline_id=
#[utoipa::path(
    get,
    path = "/api/deals/stats/pipeline",
    tag = "Deals",
    params(PipelineStatsQuery),
    responses(
        (status = 200, description = "Colunas do Kanban com os negócios abertos", body = Vec<StageColumn>),
        (status = 404, description = "Funil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn pipeline_board(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PipelineStatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let columns = app_state
        .deal_service
        .pipeline_board(user.caller(), query.pipeline_id)
        .await?;
    Ok((StatusCode::OK, Json(columns)))
}

// GET /api/deals/{id}
#[utoipa::path(
    get,
    path = "/api/deals/{id}",
    tag = "Deals",
    params(("id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 200, description = "Negócio", body = Deal),
        (status = 403, description = "Fora do escopo do usuário"),
        (status = 404, description = "Negócio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_deal(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deal = app_state.deal_service.get(user.caller(), id).await?;
    Ok((StatusCode::OK, Json(deal)))
}

// PUT /api/deals/{id}
#[utoipa::path(
    put,
    path = "/api/deals/{id}",
    tag = "Deals",
    params(("id" = Uuid, Path, description = "ID do negócio")),
    request_body = UpdateDealPayload,
    responses(
        (status = 200, description = "Negócio atualizado", body = Deal),
        (status = 403, description = "Fora do escopo do usuário"),
        (status = 404, description = "Negócio ou referência não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_deal(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDealPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let deal = app_state.deal_service.update(user.caller(), id, &payload).await?;
    Ok((StatusCode::OK, Json(deal)))
}

// DELETE /api/deals/{id}
#[utoipa::path(
    delete,
    path = "/api/deals/{id}",
    tag = "Deals",
    params(("id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 204, description = "Negócio removido"),
        (status = 403, description = "Apenas admin ou o gerente responsável"),
        (status = 404, description = "Negócio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_deal(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.deal_service.delete(user.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/deals/{id}/move
#[utoipa::path(
    post,
    path = "/api/deals/{id}/move",
    tag = "Deals",
    params(("id" = Uuid, Path, description = "ID do negócio")),
    request_body = MoveDealPayload,
    responses(
        (status = 200, description = "Negócio movido; status recalculado", body = Deal),
        (status = 403, description = "Fora do escopo do usuário"),
        (status = 404, description = "Negócio ou etapa não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn move_deal(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveDealPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let deal = app_state.deal_service.move_to_stage(user.caller(), id, &payload).await?;
    Ok((StatusCode::OK, Json(deal)))
}
