pub mod auth;
pub mod crm;
pub mod stages;
pub mod approvals;
pub mod imports;
pub mod notifications;
