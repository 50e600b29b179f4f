// src/services/crm_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, postcode},
    db::CrmRepository,
    models::crm::{Customer, Job, Project},
};

#[derive(Clone)]
pub struct CrmService {
    crm_repo: CrmRepository,
}

impl CrmService {
    pub fn new(crm_repo: CrmRepository) -> Self {
        Self { crm_repo }
    }

    pub async fn create_customer(
        &self,
        name: &str,
        address: Option<&str>,
        postcode: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
        created_by: Uuid,
    ) -> Result<Customer, AppError> {
        // Take the postcode as given when supplied; otherwise pull it out of
        // the address so lookups by postcode still work for pasted addresses.
        let postcode = postcode
            .map(|p| p.trim().to_uppercase())
            .filter(|p| !p.is_empty())
            .or_else(|| address.and_then(postcode::extract_postcode));

        self.crm_repo
            .create_customer(name, address, postcode.as_deref(), phone, email, created_by)
            .await
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        self.crm_repo.list_customers().await
    }

    pub async fn get_customer(&self, id: Uuid) -> Result<Customer, AppError> {
        self.crm_repo
            .get_customer(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Customer".to_string()))
    }

    pub async fn create_project(
        &self,
        customer_id: Uuid,
        name: &str,
        project_type: Option<&str>,
        measure_date: Option<NaiveDate>,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<Project, AppError> {
        // Surface a clean 404 instead of a raw foreign key violation
        self.get_customer(customer_id).await?;

        self.crm_repo
            .create_project(customer_id, name, project_type, measure_date, notes, created_by)
            .await
    }

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
        self.get_customer(customer_id).await?;

        self.crm_repo
            .create_job(
                customer_id,
                reference,
                job_type,
                quote_amount,
                survey_date,
                fit_date,
                team_name,
                fitter_name,
                salesperson_name,
                supply_only,
                created_by,
            )
            .await
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Job, AppError> {
        self.crm_repo
            .get_job(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Job".to_string()))
    }
}
