// src/db/notification_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::notification::ProductionNotification};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a production notification. Executor-generic so the stage
    /// engine can emit it inside the stage-change transaction.
    pub async fn insert_production<'e, E>(
        &self,
        executor: E,
        job_id: Option<Uuid>,
        customer_id: Option<Uuid>,
        message: &str,
        moved_by: &str,
    ) -> Result<ProductionNotification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification = sqlx::query_as::<_, ProductionNotification>(
            r#"
            INSERT INTO production_notifications (job_id, customer_id, message, moved_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(customer_id)
        .bind(message)
        .bind(moved_by)
        .fetch_one(executor)
        .await?;

        Ok(notification)
    }

    /// The production feed is shared rather than per-user; polling clients
    /// normally ask for unread rows only.
    pub async fn list_production(
        &self,
        unread_only: bool,
    ) -> Result<Vec<ProductionNotification>, AppError> {
        let query = if unread_only {
            "SELECT * FROM production_notifications WHERE read = FALSE ORDER BY created_at DESC"
        } else {
            "SELECT * FROM production_notifications ORDER BY created_at DESC"
        };

        let notifications = sqlx::query_as::<_, ProductionNotification>(query)
            .fetch_all(&self.pool)
            .await?;
        Ok(notifications)
    }

    /// Marks one notification read. Idempotent; None when the id is unknown.
    pub async fn mark_production_read(
        &self,
        id: Uuid,
    ) -> Result<Option<ProductionNotification>, AppError> {
        let notification = sqlx::query_as::<_, ProductionNotification>(
            r#"
            UPDATE production_notifications
            SET read = TRUE
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }
}
