// src/handlers/notifications.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{approval::ApprovalNotification, notification::ProductionNotification},
};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionFeedQuery {
    // Defaults to unread-only, which is what the workshop screen polls for
    pub unread: Option<bool>,
}

// GET /api/notifications/production
#[utoipa::path(
    get,
    path = "/api/notifications/production",
    tag = "Notifications",
    params(ProductionFeedQuery),
    responses(
        (status = 200, description = "Production notifications, newest first", body = Vec<ProductionNotification>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_production(
    State(app_state): State<AppState>,
    Query(query): Query<ProductionFeedQuery>,
) -> Result<Json<Vec<ProductionNotification>>, AppError> {
    let unread_only = query.unread.unwrap_or(true);
    let notifications = app_state
        .notification_service
        .list_production(unread_only)
        .await?;

    Ok(Json(notifications))
}

// PATCH /api/notifications/production/{id}/read
#[utoipa::path(
    patch,
    path = "/api/notifications/production/{id}/read",
    tag = "Notifications",
    responses(
        (status = 200, description = "Notification marked read", body = ProductionNotification),
        (status = 404, description = "Unknown notification")
    ),
    params(
        ("id" = Uuid, Path, description = "Notification id")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_production_read(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductionNotification>, AppError> {
    let notification = app_state
        .notification_service
        .mark_production_read(id)
        .await?;

    Ok(Json(notification))
}

// GET /api/notifications/approvals
#[utoipa::path(
    get,
    path = "/api/notifications/approvals",
    tag = "Notifications",
    responses(
        (status = 200, description = "The caller's approval notifications, newest first", body = Vec<ApprovalNotification>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_approval(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<ApprovalNotification>>, AppError> {
    let notifications = app_state
        .notification_service
        .list_approval_for(user.id)
        .await?;

    Ok(Json(notifications))
}

// PATCH /api/notifications/approvals/{id}/read
#[utoipa::path(
    patch,
    path = "/api/notifications/approvals/{id}/read",
    tag = "Notifications",
    responses(
        (status = 200, description = "Read flag flipped", body = ApprovalNotification),
        (status = 404, description = "Not the caller's notification, or unknown")
    ),
    params(
        ("id" = Uuid, Path, description = "Notification id")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_approval_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApprovalNotification>, AppError> {
    let notification = app_state
        .notification_service
        .toggle_approval_read(id, user.id)
        .await?;

    Ok(Json(notification))
}
