// src/models/approval.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "approval_status", rename_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

// What kind of document a submitted form represents. Decided once when the
// form is stored, from the flags the client embeds in the payload, instead of
// re-sniffing the payload on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_kind", rename_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    Invoice,
    Receipt,
    Checklist,
    Form,
}

impl DocumentKind {
    /// Classifies a submitted form payload. Clients mark invoices, receipts
    /// and checklists with boolean flags; anything unmarked is a generic form.
    pub fn classify(payload: &Value) -> Self {
        let flag = |key: &str| payload.get(key).and_then(Value::as_bool).unwrap_or(false);

        if flag("isInvoice") || flag("is_invoice") {
            DocumentKind::Invoice
        } else if flag("isReceipt") || flag("is_receipt") {
            DocumentKind::Receipt
        } else if flag("isChecklist") || flag("is_checklist") {
            DocumentKind::Checklist
        } else {
            DocumentKind::Form
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Receipt => "receipt",
            DocumentKind::Checklist => "checklist",
            DocumentKind::Form => "form",
        }
    }
}

// --- ENTITIES ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFormData {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub project_id: Uuid,

    // Opaque serialized form content; the backend only classifies it
    pub form_payload: Value,
    pub document_kind: DocumentKind,

    pub approval_status: ApprovalStatus,
    pub approved_by: Option<Uuid>,
    pub approval_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,

    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub form_data_id: Uuid,
    pub document_kind: DocumentKind,
    pub status: ApprovalStatus,
    #[schema(example = "Your invoice for Sarah Whitfield was approved by Gemma Price")]
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// A pending document as shown to approvers: the form row enriched with the
// creator's and customer's display names.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingFormRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub project_id: Uuid,
    pub form_payload: Value,
    pub document_kind: DocumentKind,
    #[schema(example = "Dan Fuller")]
    pub created_by_name: String,
    #[schema(example = "Sarah Whitfield")]
    pub customer_name: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_flagged_payloads() {
        assert_eq!(
            DocumentKind::classify(&json!({"isInvoice": true, "total": 950})),
            DocumentKind::Invoice
        );
        assert_eq!(
            DocumentKind::classify(&json!({"is_receipt": true})),
            DocumentKind::Receipt
        );
        assert_eq!(
            DocumentKind::classify(&json!({"isChecklist": true})),
            DocumentKind::Checklist
        );
    }

    #[test]
    fn invoice_flag_wins_over_later_flags() {
        let payload = json!({"isInvoice": true, "isChecklist": true});
        assert_eq!(DocumentKind::classify(&payload), DocumentKind::Invoice);
    }

    #[test]
    fn unflagged_payloads_are_generic_forms() {
        assert_eq!(DocumentKind::classify(&json!({"fields": []})), DocumentKind::Form);
        // A false flag is the same as no flag
        assert_eq!(
            DocumentKind::classify(&json!({"isInvoice": false})),
            DocumentKind::Form
        );
        // Non-boolean flag values are ignored rather than trusted
        assert_eq!(
            DocumentKind::classify(&json!({"isInvoice": "yes"})),
            DocumentKind::Form
        );
    }
}
