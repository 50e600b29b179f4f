pub mod auth;
pub use auth::AuthService;
pub mod crm_service;
pub use crm_service::CrmService;
pub mod stage_service;
pub use stage_service::StageService;
pub mod approval_service;
pub use approval_service::ApprovalService;
pub mod import_service;
pub use import_service::ImportService;
pub mod notification_service;
pub use notification_service::NotificationService;
