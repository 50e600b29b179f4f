// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Raised when a customer or job reaches the Accepted stage, so the
// production team sees new work without anyone forwarding e-mails.
// Polled by the web client; `read` flips once someone has seen it.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionNotification {
    pub id: Uuid,
    pub job_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    #[schema(example = "Job JOB-1042 moved to Accepted by Gemma Price")]
    pub message: String,
    #[schema(example = "Gemma Price")]
    pub moved_by: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
