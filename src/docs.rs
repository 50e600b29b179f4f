// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- CRM ---
        handlers::crm::create_customer,
        handlers::crm::list_customers,
        handlers::crm::get_customer,
        handlers::crm::create_project,
        handlers::crm::create_job,
        handlers::crm::get_job,

        // --- Stages ---
        handlers::stages::update_customer_stage,
        handlers::stages::update_job_stage,

        // --- Approvals ---
        handlers::approvals::submit_form,
        handlers::approvals::list_pending,
        handlers::approvals::approve_form,
        handlers::approvals::reject_form,

        // --- Imports ---
        handlers::imports::upload_import,
        handlers::imports::get_import_status,

        // --- Notifications ---
        handlers::notifications::list_production,
        handlers::notifications::mark_production_read,
        handlers::notifications::list_approval,
        handlers::notifications::toggle_approval_read,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- CRM ---
            models::crm::PipelineStage,
            models::crm::Customer,
            models::crm::Project,
            models::crm::Job,
            models::crm::StageUpdateOutcome,

            // --- Approvals ---
            models::approval::ApprovalStatus,
            models::approval::DocumentKind,
            models::approval::CustomerFormData,
            models::approval::ApprovalNotification,
            models::approval::PendingFormRow,

            // --- Catalogue ---
            models::catalog::ImportType,
            models::catalog::ImportStatus,
            models::catalog::Brand,
            models::catalog::ApplianceCategory,
            models::catalog::Product,
            models::catalog::RowError,
            models::catalog::DataImport,

            // --- Notifications ---
            models::notification::ProductionNotification,

            // --- Payloads ---
            handlers::crm::CreateCustomerPayload,
            handlers::crm::CreateProjectPayload,
            handlers::crm::CreateJobPayload,
            handlers::stages::UpdateStagePayload,
            handlers::approvals::SubmitFormPayload,
            handlers::approvals::ApproveFormPayload,
            handlers::approvals::RejectFormPayload,
            handlers::imports::ImportStartedResponse,
            handlers::imports::ImportUploadForm,
        )
    ),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "The authenticated user"),
        (name = "CRM", description = "Customers, projects and jobs"),
        (name = "Stages", description = "Pipeline stage changes and propagation"),
        (name = "Approvals", description = "Document submission and review"),
        (name = "Imports", description = "Supplier price-list imports"),
        (name = "Notifications", description = "Production and approval feeds")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
