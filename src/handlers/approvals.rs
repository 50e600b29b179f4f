// src/handlers/approvals.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{ApproverRole, RequireRole},
    },
    models::approval::{CustomerFormData, PendingFormRow},
};

// =============================================================================
//  1. SUBMISSION (any authenticated user)
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormPayload {
    pub customer_id: Uuid,
    pub project_id: Uuid,

    // Opaque to the backend apart from the document-kind flags
    #[schema(example = json!({"isInvoice": true, "total": 950}))]
    pub form_payload: Value,
}

// POST /api/forms
#[utoipa::path(
    post,
    path = "/api/forms",
    tag = "Approvals",
    request_body = SubmitFormPayload,
    responses(
        (status = 201, description = "Form stored pending approval", body = CustomerFormData),
        (status = 400, description = "Project does not belong to the customer"),
        (status = 404, description = "Unknown project")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_form(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<SubmitFormPayload>,
) -> Result<impl IntoResponse, AppError> {
    let form = app_state
        .approval_service
        .submit_form(
            payload.customer_id,
            payload.project_id,
            payload.form_payload,
            &user,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(form)))
}

// =============================================================================
//  2. REVIEW (managers and HR)
// =============================================================================

// GET /api/approvals/pending
#[utoipa::path(
    get,
    path = "/api/approvals/pending",
    tag = "Approvals",
    responses(
        (status = 200, description = "Pending documents, newest first", body = Vec<PendingFormRow>),
        (status = 403, description = "Caller is not a manager or HR")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pending(
    State(app_state): State<AppState>,
    _approver: RequireRole<ApproverRole>,
) -> Result<Json<Vec<PendingFormRow>>, AppError> {
    let pending = app_state.approval_service.list_pending().await?;
    Ok(Json(pending))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveFormPayload {
    pub form_data_id: Uuid,
}

// POST /api/approvals/approve
#[utoipa::path(
    post,
    path = "/api/approvals/approve",
    tag = "Approvals",
    request_body = ApproveFormPayload,
    responses(
        (status = 200, description = "Document approved; submitter notified", body = CustomerFormData),
        (status = 403, description = "Caller is not a manager or HR"),
        (status = 404, description = "Unknown document"),
        (status = 409, description = "Document already decided")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_form(
    State(app_state): State<AppState>,
    _approver: RequireRole<ApproverRole>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<ApproveFormPayload>,
) -> Result<Json<CustomerFormData>, AppError> {
    let form = app_state
        .approval_service
        .approve(payload.form_data_id, &user)
        .await?;

    Ok(Json(form))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectFormPayload {
    pub form_data_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Totals do not match the quote")]
    pub reason: String,
}

// POST /api/approvals/reject
#[utoipa::path(
    post,
    path = "/api/approvals/reject",
    tag = "Approvals",
    request_body = RejectFormPayload,
    responses(
        (status = 200, description = "Document rejected; submitter notified", body = CustomerFormData),
        (status = 400, description = "Blank rejection reason"),
        (status = 403, description = "Caller is not a manager or HR"),
        (status = 404, description = "Unknown document"),
        (status = 409, description = "Document already decided")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_form(
    State(app_state): State<AppState>,
    _approver: RequireRole<ApproverRole>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<RejectFormPayload>,
) -> Result<Json<CustomerFormData>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let form = app_state
        .approval_service
        .reject(payload.form_data_id, &payload.reason, &user)
        .await?;

    Ok(Json(form))
}
