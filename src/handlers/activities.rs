// src/handlers/activities.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::activity::{Activity, ActivityFilters, CreateActivityPayload},
};

// GET /api/activities
#[utoipa::path(
    get,
    path = "/api/activities",
    tag = "Activities",
    params(ActivityFilters, Pagination),
    responses(
        (status = 200, description = "Histórico, mais recentes primeiro", body = Vec<Activity>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_activities(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(filters): Query<ActivityFilters>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let activities = app_state.activity_service.list(user.caller(), &filters, page).await?;
    Ok((StatusCode::OK, Json(activities)))
}

// POST /api/activities
#[utoipa::path(
    post,
    path = "/api/activities",
    tag = "Activities",
    request_body = CreateActivityPayload,
    responses(
        (status = 201, description = "Interação registrada", body = Activity),
        (status = 404, description = "Negócio ou cliente não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_activity(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateActivityPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let activity = app_state.activity_service.log(user.caller(), &payload).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}
