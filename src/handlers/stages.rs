// src/handlers/stages.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::crm::{PipelineStage, StageUpdateOutcome},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStagePayload {
    // Unknown stage names are refused at deserialization
    #[schema(example = "Accepted")]
    pub new_stage: PipelineStage,

    #[schema(example = "signed contract")]
    pub reason: Option<String>,
}

// PATCH /api/customers/{id}/stage
#[utoipa::path(
    patch,
    path = "/api/customers/{id}/stage",
    tag = "Stages",
    request_body = UpdateStagePayload,
    responses(
        (status = 200, description = "Outcome; changed=false when the stage already matched or the customer follows its projects and jobs", body = StageUpdateOutcome),
        (status = 404, description = "Unknown customer"),
        (status = 409, description = "Customer changed concurrently")
    ),
    params(
        ("id" = Uuid, Path, description = "Customer id")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer_stage(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStagePayload>,
) -> Result<Json<StageUpdateOutcome>, AppError> {
    let outcome = app_state
        .stage_service
        .update_customer_stage(id, payload.new_stage, payload.reason.as_deref(), &user)
        .await?;

    Ok(Json(outcome))
}

// PATCH /api/jobs/{id}/stage
#[utoipa::path(
    patch,
    path = "/api/jobs/{id}/stage",
    tag = "Stages",
    request_body = UpdateStagePayload,
    responses(
        (status = 200, description = "Outcome; the customer's stage follows when this is its only project or job", body = StageUpdateOutcome),
        (status = 404, description = "Unknown job"),
        (status = 409, description = "Job or customer changed concurrently")
    ),
    params(
        ("id" = Uuid, Path, description = "Job id")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_job_stage(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStagePayload>,
) -> Result<Json<StageUpdateOutcome>, AppError> {
    let outcome = app_state
        .stage_service
        .update_job_stage(id, payload.new_stage, payload.reason.as_deref(), &user)
        .await?;

    Ok(Json(outcome))
}
