// src/handlers/crm.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::crm::{Customer, Job, Project},
};

// =============================================================================
//  1. CUSTOMERS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Sarah Whitfield")]
    pub name: String,

    #[schema(example = "14 Millbrook Lane, Exeter EX2 6QJ")]
    pub address: Option<String>,

    // Derived from the address when omitted
    #[schema(example = "EX2 6QJ")]
    pub postcode: Option<String>,

    #[schema(example = "07700 900123")]
    pub phone: Option<String>,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "sarah@example.co.uk")]
    pub email: Option<String>,
}

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "CRM",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Customer created in stage Lead", body = Customer)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let customer = app_state
        .crm_service
        .create_customer(
            &payload.name,
            payload.address.as_deref(),
            payload.postcode.as_deref(),
            payload.phone.as_deref(),
            payload.email.as_deref(),
            user.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "CRM",
    responses(
        (status = 200, description = "All customers, newest first", body = Vec<Customer>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let customers = app_state.crm_service.list_customers().await?;
    Ok(Json(customers))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "CRM",
    responses(
        (status = 200, description = "The customer", body = Customer),
        (status = 404, description = "Unknown customer")
    ),
    params(
        ("id" = Uuid, Path, description = "Customer id")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    let customer = app_state.crm_service.get_customer(id).await?;
    Ok(Json(customer))
}

// =============================================================================
//  2. PROJECTS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Kitchen refit")]
    pub name: String,

    #[schema(example = "kitchen")]
    pub project_type: Option<String>,

    #[schema(example = "2026-09-02")]
    pub measure_date: Option<NaiveDate>,

    pub notes: Option<String>,
}

// POST /api/customers/{id}/projects
#[utoipa::path(
    post,
    path = "/api/customers/{id}/projects",
    tag = "CRM",
    request_body = CreateProjectPayload,
    responses(
        (status = 201, description = "Project created against the customer", body = Project),
        (status = 404, description = "Unknown customer")
    ),
    params(
        ("id" = Uuid, Path, description = "Customer id")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let project = app_state
        .crm_service
        .create_project(
            customer_id,
            &payload.name,
            payload.project_type.as_deref(),
            payload.measure_date,
            payload.notes.as_deref(),
            user.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

// =============================================================================
//  3. JOBS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobPayload {
    pub customer_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "K-1042")]
    pub reference: String,

    #[schema(example = "kitchen")]
    pub job_type: Option<String>,

    #[schema(example = "12500.00")]
    pub quote_amount: Option<Decimal>,

    #[schema(example = "2026-09-10")]
    pub survey_date: Option<NaiveDate>,

    #[schema(example = "2026-10-05")]
    pub fit_date: Option<NaiveDate>,

    #[schema(example = "Team North")]
    pub team_name: Option<String>,

    #[schema(example = "Mick Doyle")]
    pub fitter_name: Option<String>,

    #[schema(example = "Gemma Price")]
    pub salesperson_name: Option<String>,

    #[serde(default)]
    pub supply_only: bool,
}

// POST /api/jobs
#[utoipa::path(
    post,
    path = "/api/jobs",
    tag = "CRM",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created in stage Lead", body = Job),
        (status = 404, description = "Unknown customer"),
        (status = 409, description = "Job reference already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_job(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let job = app_state
        .crm_service
        .create_job(
            payload.customer_id,
            &payload.reference,
            payload.job_type.as_deref(),
            payload.quote_amount,
            payload.survey_date,
            payload.fit_date,
            payload.team_name.as_deref(),
            payload.fitter_name.as_deref(),
            payload.salesperson_name.as_deref(),
            payload.supply_only,
            user.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(job)))
}

// GET /api/jobs/{id}
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    tag = "CRM",
    responses(
        (status = 200, description = "The job", body = Job),
        (status = 404, description = "Unknown job")
    ),
    params(
        ("id" = Uuid, Path, description = "Job id")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_job(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    let job = app_state.crm_service.get_job(id).await?;
    Ok(Json(job))
}
