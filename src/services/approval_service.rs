// src/services/approval_service.rs

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ApprovalRepository, CrmRepository},
    models::{
        approval::{ApprovalStatus, CustomerFormData, DocumentKind, PendingFormRow},
        auth::User,
    },
};

/// The document approval workflow: staff submit forms against a customer and
/// project, managers and HR decide them. Decisions are terminal.
#[derive(Clone)]
pub struct ApprovalService {
    approval_repo: ApprovalRepository,
    crm_repo: CrmRepository,
    pool: PgPool,
}

impl ApprovalService {
    pub fn new(approval_repo: ApprovalRepository, crm_repo: CrmRepository, pool: PgPool) -> Self {
        Self {
            approval_repo,
            crm_repo,
            pool,
        }
    }

    /// Stores a submitted form in `pending`. The document kind is classified
    /// once here, from the payload's flags, and never re-derived.
    pub async fn submit_form(
        &self,
        customer_id: Uuid,
        project_id: Uuid,
        form_payload: Value,
        actor: &User,
    ) -> Result<CustomerFormData, AppError> {
        let project = self
            .crm_repo
            .get_project(project_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Project".to_string()))?;

        if project.customer_id != customer_id {
            return Err(AppError::InvalidInput(
                "Project does not belong to this customer.".to_string(),
            ));
        }

        let kind = DocumentKind::classify(&form_payload);

        self.approval_repo
            .insert_form_data(customer_id, project_id, &form_payload, kind, actor.id)
            .await
    }

    pub async fn list_pending(&self) -> Result<Vec<PendingFormRow>, AppError> {
        self.approval_repo.list_pending().await
    }

    pub async fn approve(
        &self,
        form_data_id: Uuid,
        actor: &User,
    ) -> Result<CustomerFormData, AppError> {
        self.decide(form_data_id, ApprovalStatus::Approved, None, actor)
            .await
    }

    pub async fn reject(
        &self,
        form_data_id: Uuid,
        reason: &str,
        actor: &User,
    ) -> Result<CustomerFormData, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::InvalidInput(
                "A rejection reason is required.".to_string(),
            ));
        }

        self.decide(form_data_id, ApprovalStatus::Rejected, Some(reason), actor)
            .await
    }

    /// Shared decision path: stamp the decision and notify the submitter in
    /// one transaction. Already-decided documents are refused.
    async fn decide(
        &self,
        form_data_id: Uuid,
        status: ApprovalStatus,
        reason: Option<&str>,
        actor: &User,
    ) -> Result<CustomerFormData, AppError> {
        let mut tx = self.pool.begin().await?;

        let form = self
            .approval_repo
            .find_form_data(&mut *tx, form_data_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Form submission".to_string()))?;

        match form.approval_status {
            ApprovalStatus::Pending => {}
            ApprovalStatus::Approved => {
                return Err(AppError::Conflict(
                    "This document has already been approved.".to_string(),
                ));
            }
            ApprovalStatus::Rejected => {
                return Err(AppError::Conflict(
                    "This document has already been rejected.".to_string(),
                ));
            }
        }

        let updated = self
            .approval_repo
            .apply_decision(&mut *tx, form_data_id, status, actor.id, reason)
            .await?;

        let customer = self
            .crm_repo
            .find_customer(&mut *tx, form.customer_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Customer".to_string()))?;

        let verb = if status == ApprovalStatus::Approved {
            "approved"
        } else {
            "rejected"
        };
        let mut message = format!(
            "Your {} for {} was {} by {}",
            form.document_kind.label(),
            customer.name,
            verb,
            actor.name
        );
        if let Some(reason) = reason {
            message.push_str(&format!(": {}", reason));
        }

        self.approval_repo
            .insert_notification(
                &mut *tx,
                form.created_by,
                form.id,
                form.document_kind,
                status,
                &message,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            form_data_id = %form_data_id,
            status = ?status,
            "form decision recorded"
        );

        Ok(updated)
    }
}
