// src/db/approval_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::approval::{
        ApprovalNotification, ApprovalStatus, CustomerFormData, DocumentKind, PendingFormRow,
    },
};

#[derive(Clone)]
pub struct ApprovalRepository {
    pool: PgPool,
}

impl ApprovalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  FORM DATA
    // =========================================================================

    pub async fn insert_form_data(
        &self,
        customer_id: Uuid,
        project_id: Uuid,
        form_payload: &Value,
        document_kind: DocumentKind,
        created_by: Uuid,
    ) -> Result<CustomerFormData, AppError> {
        let form = sqlx::query_as::<_, CustomerFormData>(
            r#"
            INSERT INTO customer_form_data
                (customer_id, project_id, form_payload, document_kind, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(project_id)
        .bind(form_payload)
        .bind(document_kind)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(form)
    }

    pub async fn find_form_data<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<CustomerFormData>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let form =
            sqlx::query_as::<_, CustomerFormData>("SELECT * FROM customer_form_data WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(form)
    }

    /// The review queue: every pending document, newest first, enriched with
    /// the submitter's and customer's display names.
    pub async fn list_pending(&self) -> Result<Vec<PendingFormRow>, AppError> {
        let rows = sqlx::query_as::<_, PendingFormRow>(
            r#"
            SELECT f.id, f.customer_id, f.project_id, f.form_payload, f.document_kind,
                   u.name AS created_by_name, c.name AS customer_name, f.created_at
            FROM customer_form_data f
            JOIN users u ON u.id = f.created_by
            JOIN customers c ON c.id = f.customer_id
            WHERE f.approval_status = 'pending'
            ORDER BY f.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Stamps a decision onto a form. `rejection_reason` is only meaningful
    /// for rejections and is stored as NULL on approvals.
    pub async fn apply_decision<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ApprovalStatus,
        decided_by: Uuid,
        rejection_reason: Option<&str>,
    ) -> Result<CustomerFormData, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let form = sqlx::query_as::<_, CustomerFormData>(
            r#"
            UPDATE customer_form_data
            SET approval_status = $1,
                approved_by = $2,
                approval_date = NOW(),
                rejection_reason = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(decided_by)
        .bind(rejection_reason)
        .bind(id)
        .fetch_one(executor)
        .await?;

        Ok(form)
    }

    // =========================================================================
    //  APPROVAL NOTIFICATIONS
    // =========================================================================

    pub async fn insert_notification<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        form_data_id: Uuid,
        document_kind: DocumentKind,
        status: ApprovalStatus,
        message: &str,
    ) -> Result<ApprovalNotification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification = sqlx::query_as::<_, ApprovalNotification>(
            r#"
            INSERT INTO approval_notifications
                (user_id, form_data_id, document_kind, status, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(form_data_id)
        .bind(document_kind)
        .bind(status)
        .bind(message)
        .fetch_one(executor)
        .await?;

        Ok(notification)
    }

    pub async fn list_notifications_for(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ApprovalNotification>, AppError> {
        let notifications = sqlx::query_as::<_, ApprovalNotification>(
            "SELECT * FROM approval_notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    /// Flips the read flag on one of the caller's own notifications. Returns
    /// None when the row does not exist or belongs to someone else.
    pub async fn toggle_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ApprovalNotification>, AppError> {
        let notification = sqlx::query_as::<_, ApprovalNotification>(
            r#"
            UPDATE approval_notifications
            SET is_read = NOT is_read
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }
}
