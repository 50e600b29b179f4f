// src/config.rs

use crate::{
    db::{
        ApprovalRepository, CatalogRepository, CrmRepository, NotificationRepository,
        UserRepository,
    },
    services::{
        ApprovalService, AuthService, CrmService, ImportService, NotificationService, StageService,
    },
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub crm_service: CrmService,
    pub stage_service: StageService,
    pub approval_service: ApprovalService,
    pub import_service: ImportService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Database connection established");

        // --- Wire the dependency graph ---
        let user_repo = UserRepository::new(db_pool.clone());
        let crm_repo = CrmRepository::new(db_pool.clone());
        let approval_repo = ApprovalRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret.clone());
        let crm_service = CrmService::new(crm_repo.clone());
        let stage_service = StageService::new(
            crm_repo.clone(),
            notification_repo.clone(),
            db_pool.clone(),
        );
        let approval_service =
            ApprovalService::new(approval_repo.clone(), crm_repo, db_pool.clone());
        let import_service = ImportService::new(catalog_repo, db_pool.clone());
        let notification_service = NotificationService::new(notification_repo, approval_repo);

        Ok(Self {
            db_pool,
            jwt_secret,
            auth_service,
            crm_service,
            stage_service,
            approval_service,
            import_service,
            notification_service,
        })
    }
}
