// src/db/crm_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{Customer, Job, PipelineStage, Project},
};

#[derive(Clone)]
pub struct CrmRepository {
    pool: PgPool,
}

impl CrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CUSTOMERS
    // =========================================================================

    pub async fn create_customer(
        &self,
        name: &str,
        address: Option<&str>,
        postcode: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
        created_by: Uuid,
    ) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, address, postcode, phone, email, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(address)
        .bind(postcode)
        .bind(phone)
        .bind(email)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let customers =
            sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(customers)
    }

    pub async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        self.find_customer(&self.pool, id).await
    }

    /// Reads one customer through any executor, so the stage engine can load
    /// it inside its own transaction.
    pub async fn find_customer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    // =========================================================================
    //  PROJECTS
    // =========================================================================

    pub async fn create_project(
        &self,
        customer_id: Uuid,
        name: &str,
        project_type: Option<&str>,
        measure_date: Option<NaiveDate>,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (customer_id, name, project_type, measure_date, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(name)
        .bind(project_type)
        .bind(measure_date)
        .bind(notes)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    pub async fn get_project(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    // =========================================================================
    //  JOBS
    // =========================================================================

    pub async fn create_job(
        &self,
        customer_id: Uuid,
        reference: &str,
        job_type: Option<&str>,
        quote_amount: Option<Decimal>,
        survey_date: Option<NaiveDate>,
        fit_date: Option<NaiveDate>,
        team_name: Option<&str>,
        fitter_name: Option<&str>,
        salesperson_name: Option<&str>,
        supply_only: bool,
        created_by: Uuid,
    ) -> Result<Job, AppError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                customer_id, reference, job_type, quote_amount,
                survey_date, fit_date, team_name, fitter_name, salesperson_name,
                supply_only, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(reference)
        .bind(job_type)
        .bind(quote_amount)
        .bind(survey_date)
        .bind(fit_date)
        .bind(team_name)
        .bind(fitter_name)
        .bind(salesperson_name)
        .bind(supply_only)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "A job with reference '{}' already exists.",
                        reference
                    ));
                }
            }
            e.into()
        })?;

        Ok(job)
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        self.find_job(&self.pool, id).await
    }

    pub async fn find_job<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Job>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(job)
    }

    // =========================================================================
    //  STAGE ENGINE SUPPORT
    // =========================================================================

    /// Total number of projects plus jobs linked to a customer. The stage
    /// engine uses this both to suppress direct customer edits and to decide
    /// whether a job stage propagates upward.
    pub async fn count_linked_entities<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM projects WHERE customer_id = $1)
                 + (SELECT COUNT(*) FROM jobs WHERE customer_id = $1)
            "#,
        )
        .bind(customer_id)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    /// Applies a stage change to a customer, appending the audit line to its
    /// notes. Guarded by `row_version`: returns the number of rows updated,
    /// which is 0 when a concurrent writer got there first.
    pub async fn apply_customer_stage<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        stage: PipelineStage,
        audit_note: &str,
        updated_by: Uuid,
        expected_version: i32,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET stage = $1,
                notes = CASE WHEN notes IS NULL OR notes = ''
                             THEN $2
                             ELSE notes || E'\n' || $2 END,
                updated_by = $3,
                updated_at = NOW(),
                row_version = row_version + 1
            WHERE id = $4 AND row_version = $5
            "#,
        )
        .bind(stage)
        .bind(audit_note)
        .bind(updated_by)
        .bind(id)
        .bind(expected_version)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Job flavour of [`apply_customer_stage`], same versioning contract.
    pub async fn apply_job_stage<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        stage: PipelineStage,
        audit_note: &str,
        updated_by: Uuid,
        expected_version: i32,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET stage = $1,
                notes = CASE WHEN notes IS NULL OR notes = ''
                             THEN $2
                             ELSE notes || E'\n' || $2 END,
                updated_by = $3,
                updated_at = NOW(),
                row_version = row_version + 1
            WHERE id = $4 AND row_version = $5
            "#,
        )
        .bind(stage)
        .bind(audit_note)
        .bind(updated_by)
        .bind(id)
        .bind(expected_version)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
