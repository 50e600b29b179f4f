// src/models/crm.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

// The sales/production pipeline. One closed set shared by customers,
// projects and jobs; maps the CREATE TYPE pipeline_stage in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "pipeline_stage", rename_all = "snake_case")]
pub enum PipelineStage {
    Lead,
    Survey,
    Design,
    Quote,
    Consultation,
    Quoted,
    Accepted,
    OnHold,
    Production,
    Delivery,
    Installation,
    Complete,
    Remedial,
    Cancelled,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Lead => "Lead",
            PipelineStage::Survey => "Survey",
            PipelineStage::Design => "Design",
            PipelineStage::Quote => "Quote",
            PipelineStage::Consultation => "Consultation",
            PipelineStage::Quoted => "Quoted",
            PipelineStage::Accepted => "Accepted",
            PipelineStage::OnHold => "OnHold",
            PipelineStage::Production => "Production",
            PipelineStage::Delivery => "Delivery",
            PipelineStage::Installation => "Installation",
            PipelineStage::Complete => "Complete",
            PipelineStage::Remedial => "Remedial",
            PipelineStage::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

// --- ENTITIES ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    #[schema(example = "Sarah Whitfield")]
    pub name: String,
    #[schema(example = "14 Harrogate Road, Leeds, LS7 3PD")]
    pub address: Option<String>,
    // Derived from the address at create/update time
    #[schema(example = "LS7 3PD")]
    pub postcode: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,

    pub stage: PipelineStage,
    #[schema(example = "active")]
    pub status: String,
    // Free-text audit trail; the stage engine appends one line per transition
    pub notes: Option<String>,
    #[schema(ignore)]
    pub row_version: i32,

    pub created_by: Uuid,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[schema(example = "Whitfield kitchen refit")]
    pub name: String,
    #[schema(example = "kitchen")]
    pub project_type: Option<String>,
    pub stage: PipelineStage,
    #[schema(value_type = Option<String>, format = Date, example = "2026-04-12")]
    pub measure_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[schema(example = "JOB-1042")]
    pub reference: String,
    #[schema(example = "kitchen")]
    pub job_type: Option<String>,
    pub stage: PipelineStage,

    #[schema(example = "8450.00")]
    pub quote_amount: Option<Decimal>,
    pub agreed_amount: Option<Decimal>,
    pub sold_amount: Option<Decimal>,
    pub deposit_paid: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date)]
    pub survey_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub fit_date: Option<NaiveDate>,

    // Denormalised display names plus optional links to real users
    pub team_name: Option<String>,
    pub fitter_name: Option<String>,
    pub fitter_id: Option<Uuid>,
    pub salesperson_name: Option<String>,
    pub salesperson_id: Option<Uuid>,

    pub supply_only: bool,
    pub remedial_required: bool,

    pub notes: Option<String>,
    #[schema(ignore)]
    pub row_version: i32,

    pub created_by: Uuid,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- STAGE ENGINE RESULT ---

// What a stage-update call reports back: either a real transition
// (`changed == true`) or a soft no-op (same stage, or suppressed because the
// customer's stage is managed from the job/project side).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageUpdateOutcome {
    pub changed: bool,
    #[schema(example = "Stage updated")]
    pub message: String,
    pub old_stage: PipelineStage,
    pub new_stage: PipelineStage,
}

impl StageUpdateOutcome {
    pub fn changed(old_stage: PipelineStage, new_stage: PipelineStage) -> Self {
        Self {
            changed: true,
            message: "Stage updated".to_string(),
            old_stage,
            new_stage,
        }
    }

    pub fn unchanged(stage: PipelineStage, message: &str) -> Self {
        Self {
            changed: false,
            message: message.to_string(),
            old_stage: stage,
            new_stage: stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_serialises_to_pascal_case_names() {
        assert_eq!(serde_json::to_string(&PipelineStage::Accepted).unwrap(), "\"Accepted\"");
        assert_eq!(serde_json::to_string(&PipelineStage::OnHold).unwrap(), "\"OnHold\"");
    }

    #[test]
    fn stage_parses_every_member_of_the_set() {
        for name in [
            "Lead", "Survey", "Design", "Quote", "Consultation", "Quoted", "Accepted",
            "OnHold", "Production", "Delivery", "Installation", "Complete", "Remedial",
            "Cancelled",
        ] {
            let parsed: PipelineStage =
                serde_json::from_str(&format!("\"{}\"", name)).expect(name);
            assert_eq!(parsed.to_string(), name);
        }
    }

    #[test]
    fn unknown_stage_value_is_rejected_at_the_boundary() {
        let result = serde_json::from_str::<PipelineStage>("\"Shipped\"");
        assert!(result.is_err());
    }

    #[test]
    fn unchanged_outcome_reports_the_same_stage_on_both_sides() {
        let outcome = StageUpdateOutcome::unchanged(PipelineStage::Quoted, "Stage not changed");
        assert!(!outcome.changed);
        assert_eq!(outcome.old_stage, outcome.new_stage);
    }
}
