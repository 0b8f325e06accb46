// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        activity::Activity,
        dashboard::{
            DashboardStats, RecentActivitiesQuery, SalesChartEntry, SalesChartQuery, StageSnapshot,
        },
    },
};

// 1. GET /api/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Indicadores gerais", body = DashboardStats)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.dashboard_service.stats(user.caller()).await?;
    Ok((StatusCode::OK, Json(stats)))
}

// 2. GET /api/dashboard/recent-activities?limit=10
#[utoipa::path(
    get,
    path = "/api/dashboard/recent-activities",
    tag = "Dashboard",
    params(RecentActivitiesQuery),
    responses(
        (status = 200, description = "Últimas interações", body = Vec<Activity>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_recent_activities(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<RecentActivitiesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let activities = app_state
        .dashboard_service
        .recent_activities(user.caller(), query.limit)
        .await?;
    Ok((StatusCode::OK, Json(activities)))
}

// 3. GET /api/dashboard/sales-chart?days=30
#[utoipa::path(
    get,
    path = "/api/dashboard/sales-chart",
    tag = "Dashboard",
    params(SalesChartQuery),
    responses(
        (status = 200, description = "Ganhos por dia de fechamento", body = Vec<SalesChartEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sales_chart(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<SalesChartQuery>,
) -> Result<impl IntoResponse, AppError> {
    let chart = app_state.dashboard_service.sales_chart(user.caller(), query.days).await?;
    Ok((StatusCode::OK, Json(chart)))
}

// 4. GET /api/dashboard/pipeline-stats
#[utoipa::path(
    get,
    path = "/api/dashboard/pipeline-stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Negócios abertos por etapa", body = Vec<StageSnapshot>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_pipeline_stats(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let stages = app_state.dashboard_service.pipeline_snapshot(user.caller()).await?;
    Ok((StatusCode::OK, Json(stages)))
}
