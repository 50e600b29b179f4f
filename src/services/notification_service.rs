// src/services/notification_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ApprovalRepository, NotificationRepository},
    models::{approval::ApprovalNotification, notification::ProductionNotification},
};

/// Read side of both notification feeds. The production feed is shared by
/// the whole workshop; approval notifications are per-user.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    approval_repo: ApprovalRepository,
}

impl NotificationService {
    pub fn new(
        notification_repo: NotificationRepository,
        approval_repo: ApprovalRepository,
    ) -> Self {
        Self {
            notification_repo,
            approval_repo,
        }
    }

    pub async fn list_production(
        &self,
        unread_only: bool,
    ) -> Result<Vec<ProductionNotification>, AppError> {
        self.notification_repo.list_production(unread_only).await
    }

    pub async fn mark_production_read(
        &self,
        id: Uuid,
    ) -> Result<ProductionNotification, AppError> {
        self.notification_repo
            .mark_production_read(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Notification".to_string()))
    }

    pub async fn list_approval_for(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ApprovalNotification>, AppError> {
        self.approval_repo.list_notifications_for(user_id).await
    }

    /// Flips the read flag on one of the caller's own approval notifications.
    pub async fn toggle_approval_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<ApprovalNotification, AppError> {
        self.approval_repo
            .toggle_notification_read(id, user_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Notification".to_string()))
    }
}
