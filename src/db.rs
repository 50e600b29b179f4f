pub mod user_repo;
pub use user_repo::UserRepository;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod approval_repo;
pub use approval_repo::ApprovalRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
