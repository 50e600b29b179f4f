// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "import_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ImportType {
    ApplianceMatrix,
    KbbPricelist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "import_status", rename_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum ImportStatus {
    Processing,
    Completed,
    Failed,
}

// --- CATALOGUE ENTITIES ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Uuid,
    #[schema(example = "Bosch")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceCategory {
    pub id: Uuid,
    #[schema(example = "Single Oven")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub category_id: Uuid,
    #[schema(example = "HBA5360B0")]
    pub model_code: String,
    pub name: String,
    #[schema(example = "Serie 4")]
    pub series: Option<String>,

    // Tiered pricing; base_price tracks the minimum tier price seen so far
    pub price_low: Option<Decimal>,
    pub price_mid: Option<Decimal>,
    pub price_high: Option<Decimal>,
    pub base_price: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- IMPORT RUNS ---

// One recoverable per-row failure inside a batch import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    // 1-based row number in the uploaded file
    #[schema(example = 7)]
    pub row: usize,
    #[schema(example = "invalid price \"n/a\"")]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataImport {
    pub id: Uuid,
    #[schema(example = "bosch-2026-matrix.csv")]
    pub filename: String,
    pub import_type: ImportType,
    pub status: ImportStatus,
    pub records_processed: i32,
    pub records_failed: i32,
    // JSON array of RowError objects, kept structured instead of a flat log
    #[schema(value_type = Vec<RowError>)]
    pub row_errors: Value,
    pub fatal_error: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // The import worker appends raw {"row", "message"} objects to the
    // `row_errors` column; this pins the typed view to that stored shape.
    #[test]
    fn row_error_wire_shape_matches_the_stored_entries() {
        let entry = RowError {
            row: 7,
            message: "invalid price 'POA'".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"row": 7, "message": "invalid price 'POA'"})
        );

        let parsed: RowError =
            serde_json::from_value(json!({"row": 7, "message": "invalid price 'POA'"})).unwrap();
        assert_eq!(parsed, entry);
    }
}
