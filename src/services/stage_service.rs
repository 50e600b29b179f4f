// src/services/stage_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CrmRepository, NotificationRepository},
    models::{
        auth::User,
        crm::{PipelineStage, StageUpdateOutcome},
    },
};

/// Applies stage changes to customers and jobs: no-op guard, audit note,
/// optimistic version check, job-to-customer propagation and the production
/// notification on reaching Accepted. Each call is one transaction.
#[derive(Clone)]
pub struct StageService {
    crm_repo: CrmRepository,
    notification_repo: NotificationRepository,
    pool: PgPool,
}

impl StageService {
    pub fn new(
        crm_repo: CrmRepository,
        notification_repo: NotificationRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            crm_repo,
            notification_repo,
            pool,
        }
    }

    pub async fn update_customer_stage(
        &self,
        customer_id: Uuid,
        new_stage: PipelineStage,
        reason: Option<&str>,
        actor: &User,
    ) -> Result<StageUpdateOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let customer = self
            .crm_repo
            .find_customer(&mut *tx, customer_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Customer".to_string()))?;

        if customer.stage == new_stage {
            return Ok(StageUpdateOutcome::unchanged(new_stage, "Stage not changed"));
        }

        // Once a customer has projects or jobs, its stage follows them; a
        // direct edit is answered softly instead of applied.
        let linked = self
            .crm_repo
            .count_linked_entities(&mut *tx, customer_id)
            .await?;
        if linked > 0 {
            return Ok(StageUpdateOutcome::unchanged(
                customer.stage,
                "Stage not changed: customer stage follows its projects and jobs",
            ));
        }

        let note = audit_note(customer.stage, new_stage, &actor.name, reason);
        let rows = self
            .crm_repo
            .apply_customer_stage(
                &mut *tx,
                customer_id,
                new_stage,
                &note,
                actor.id,
                customer.row_version,
            )
            .await?;
        if rows == 0 {
            return Err(AppError::Conflict(
                "Customer was changed by someone else. Reload and retry.".to_string(),
            ));
        }

        if new_stage == PipelineStage::Accepted && customer.stage != PipelineStage::Accepted {
            let message = format!("Customer {} moved to Accepted", customer.name);
            self.notification_repo
                .insert_production(&mut *tx, None, Some(customer_id), &message, &actor.name)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            customer_id = %customer_id,
            old_stage = %customer.stage,
            new_stage = %new_stage,
            "customer stage updated"
        );

        Ok(StageUpdateOutcome::changed(customer.stage, new_stage))
    }

    pub async fn update_job_stage(
        &self,
        job_id: Uuid,
        new_stage: PipelineStage,
        reason: Option<&str>,
        actor: &User,
    ) -> Result<StageUpdateOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let job = self
            .crm_repo
            .find_job(&mut *tx, job_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Job".to_string()))?;

        if job.stage == new_stage {
            return Ok(StageUpdateOutcome::unchanged(new_stage, "Stage not changed"));
        }

        let customer = self
            .crm_repo
            .find_customer(&mut *tx, job.customer_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Customer".to_string()))?;

        let note = audit_note(job.stage, new_stage, &actor.name, reason);
        let rows = self
            .crm_repo
            .apply_job_stage(&mut *tx, job_id, new_stage, &note, actor.id, job.row_version)
            .await?;
        if rows == 0 {
            return Err(AppError::Conflict(
                "Job was changed by someone else. Reload and retry.".to_string(),
            ));
        }

        let linked = self
            .crm_repo
            .count_linked_entities(&mut *tx, job.customer_id)
            .await?;
        if propagates_to_customer(linked, customer.stage, new_stage) {
            let sync_note = sync_audit_note(customer.stage, new_stage, &actor.name, &job.reference);
            let rows = self
                .crm_repo
                .apply_customer_stage(
                    &mut *tx,
                    customer.id,
                    new_stage,
                    &sync_note,
                    actor.id,
                    customer.row_version,
                )
                .await?;
            if rows == 0 {
                return Err(AppError::Conflict(
                    "Customer was changed by someone else. Reload and retry.".to_string(),
                ));
            }
        }

        // One notification per logical operation, even when the stage also
        // propagated to the customer.
        if new_stage == PipelineStage::Accepted && job.stage != PipelineStage::Accepted {
            let message = format!(
                "Job {} for {} moved to Accepted",
                job.reference, customer.name
            );
            self.notification_repo
                .insert_production(
                    &mut *tx,
                    Some(job.id),
                    Some(job.customer_id),
                    &message,
                    &actor.name,
                )
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            job_id = %job_id,
            old_stage = %job.stage,
            new_stage = %new_stage,
            "job stage updated"
        );

        Ok(StageUpdateOutcome::changed(job.stage, new_stage))
    }
}

/// The customer mirrors a job's stage only while that job is the customer's
/// single linked entity. With more than one, there is no one stage to follow.
fn propagates_to_customer(
    linked: i64,
    customer_stage: PipelineStage,
    new_stage: PipelineStage,
) -> bool {
    linked <= 1 && customer_stage != new_stage
}

/// One line appended to the entity's notes on every applied stage change.
fn audit_note(
    old: PipelineStage,
    new: PipelineStage,
    actor_name: &str,
    reason: Option<&str>,
) -> String {
    let stamp = Utc::now().format("%Y-%m-%d %H:%M UTC");
    let mut note = format!("[{stamp}] Stage changed: {old} -> {new} by {actor_name}");
    if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
        note.push_str(&format!(" ({reason})"));
    }
    note
}

fn sync_audit_note(
    old: PipelineStage,
    new: PipelineStage,
    actor_name: &str,
    job_reference: &str,
) -> String {
    let stamp = Utc::now().format("%Y-%m-%d %H:%M UTC");
    format!("[{stamp}] Stage synced from job {job_reference}: {old} -> {new} by {actor_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_note_includes_stages_actor_and_reason() {
        let note = audit_note(
            PipelineStage::Quoted,
            PipelineStage::Accepted,
            "Gemma Price",
            Some("signed contract"),
        );
        assert!(note.contains("Stage changed: Quoted -> Accepted by Gemma Price (signed contract)"));
        assert!(note.starts_with('['));
    }

    #[test]
    fn audit_note_omits_blank_reason() {
        let bare = audit_note(PipelineStage::Lead, PipelineStage::Survey, "Dan Fuller", None);
        assert!(bare.ends_with("by Dan Fuller"));

        let whitespace = audit_note(
            PipelineStage::Lead,
            PipelineStage::Survey,
            "Dan Fuller",
            Some("   "),
        );
        assert!(whitespace.ends_with("by Dan Fuller"));
    }

    #[test]
    fn job_stage_propagates_only_for_a_single_linked_entity() {
        assert!(propagates_to_customer(1, PipelineStage::Lead, PipelineStage::Accepted));
        assert!(!propagates_to_customer(2, PipelineStage::Lead, PipelineStage::Accepted));
        // Customer already in step: nothing to sync
        assert!(!propagates_to_customer(
            1,
            PipelineStage::Accepted,
            PipelineStage::Accepted
        ));
    }

    #[test]
    fn sync_note_names_the_source_job() {
        let note = sync_audit_note(
            PipelineStage::Lead,
            PipelineStage::Production,
            "Dan Fuller",
            "K-1042",
        );
        assert!(note.contains("Stage synced from job K-1042: Lead -> Production by Dan Fuller"));
    }
}
