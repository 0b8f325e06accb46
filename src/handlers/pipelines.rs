// src/handlers/pipelines.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::pipeline::{
        CreatePipelinePayload, CreateStagePayload, DealStage, Pipeline, PipelineDetail,
        UpdatePipelinePayload, UpdateStagePayload,
    },
};

// =============================================================================
//  ÁREA 1: FUNIS
// =============================================================================

// GET /api/pipelines
#[utoipa::path(
    get,
    path = "/api/pipelines",
    tag = "Pipelines",
    responses(
        (status = 200, description = "Funis ativos, por ordem", body = Vec<Pipeline>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pipelines(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let pipelines = app_state.pipeline_service.list_active().await?;
    Ok((StatusCode::OK, Json(pipelines)))
}

// POST /api/pipelines
#[utoipa::path(
    post,
    path = "/api/pipelines",
    tag = "Pipelines",
    request_body = CreatePipelinePayload,
    responses(
        (status = 201, description = "Funil criado", body = Pipeline),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_pipeline(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreatePipelinePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pipeline = app_state.pipeline_service.create(user.caller(), &payload).await?;
    Ok((StatusCode::CREATED, Json(pipeline)))
}

// GET /api/pipelines/{id}
#[utoipa::path(
    get,
    path = "/api/pipelines/{id}",
    tag = "Pipelines",
    params(("id" = Uuid, Path, description = "ID do funil")),
    responses(
        (status = 200, description = "Funil com suas etapas", body = PipelineDetail),
        (status = 404, description = "Funil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_pipeline(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.pipeline_service.get_detail(id).await?;
    Ok((StatusCode::OK, Json(detail)))
}

// PUT /api/pipelines/{id}
#[utoipa::path(
    put,
    path = "/api/pipelines/{id}",
    tag = "Pipelines",
    params(("id" = Uuid, Path, description = "ID do funil")),
    request_body = UpdatePipelinePayload,
    responses(
        (status = 200, description = "Funil atualizado", body = Pipeline),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Funil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_pipeline(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePipelinePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pipeline = app_state.pipeline_service.update(user.caller(), id, &payload).await?;
    Ok((StatusCode::OK, Json(pipeline)))
}

// =============================================================================
//  ÁREA 2: ETAPAS
// =============================================================================

// GET /api/pipelines/{id}/stages
#[utoipa::path(
    get,
    path = "/api/pipelines/{id}/stages",
    tag = "Pipelines",
    params(("id" = Uuid, Path, description = "ID do funil")),
    responses(
        (status = 200, description = "Etapas por ordem", body = Vec<DealStage>),
        (status = 404, description = "Funil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_stages(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(pipeline_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let stages = app_state.pipeline_service.list_stages(pipeline_id).await?;
    Ok((StatusCode::OK, Json(stages)))
}

// POST /api/pipelines/{id}/stages
#[utoipa::path(
    post,
    path = "/api/pipelines/{id}/stages",
    tag = "Pipelines",
    params(("id" = Uuid, Path, description = "ID do funil")),
    request_body = CreateStagePayload,
    responses(
        (status = 201, description = "Etapa criada", body = DealStage),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Funil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_stage(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(pipeline_id): Path<Uuid>,
    Json(payload): Json<CreateStagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let stage = app_state
        .pipeline_service
        .create_stage(user.caller(), pipeline_id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(stage)))
}

// PUT /api/pipelines/stages/{id}
#[utoipa::path(
    put,
    path = "/api/pipelines/stages/{id}",
    tag = "Pipelines",
    params(("id" = Uuid, Path, description = "ID da etapa")),
    request_body = UpdateStagePayload,
    responses(
        (status = 200, description = "Etapa atualizada", body = DealStage),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Etapa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_stage(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let stage = app_state.pipeline_service.update_stage(user.caller(), id, &payload).await?;
    Ok((StatusCode::OK, Json(stage)))
}

// DELETE /api/pipelines/stages/{id}
#[utoipa::path(
    delete,
    path = "/api/pipelines/stages/{id}",
    tag = "Pipelines",
    params(("id" = Uuid, Path, description = "ID da etapa")),
    responses(
        (status = 204, description = "Etapa removida"),
        (status = 400, description = "Etapa ainda possui negócios"),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Etapa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_stage(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.pipeline_service.delete_stage(user.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
