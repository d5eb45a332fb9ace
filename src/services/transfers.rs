//! Site-to-site transfer workflow

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::TransferStatus,
        equipment::Equipment,
        transfer::{CreateTransfer, EquipmentTransfer, TransferDecision, TransferDetails, TransferQuery},
        user::Session,
    },
    repository::Repository,
    services::storage::{transfer_photo_path, StorageService},
};

#[derive(Clone)]
pub struct TransfersService {
    repository: Repository,
    storage: StorageService,
}

impl TransfersService {
    pub fn new(repository: Repository, storage: StorageService) -> Self {
        Self { repository, storage }
    }

    /// Ask to move part of an equipment row from the supervisor's site to
    /// another site
    pub async fn create(&self, session: &Session, data: CreateTransfer) -> AppResult<EquipmentTransfer> {
        let from_site_id = session.require_site()?;
        data.validate()?;

        if data.to_site_id == from_site_id {
            return Err(AppError::Validation(
                "Destination must be a different site".to_string(),
            ));
        }
        if !self.repository.sites.exists(data.to_site_id).await? {
            return Err(AppError::NotFound(format!("Site {} not found", data.to_site_id)));
        }

        let equipment = self.repository.equipment.get_by_id(data.equipment_id).await?;
        check_source(from_site_id, &data, &equipment)?;

        let transfer = self
            .repository
            .transfers
            .create(&equipment, from_site_id, session.user_id, &data)
            .await?;
        tracing::info!(
            transfer_id = transfer.id,
            from_site_id,
            to_site_id = transfer.to_site_id,
            quantity = transfer.quantity,
            "Transfer requested"
        );
        Ok(transfer)
    }

    /// Admins get the full transaction log; supervisors the transfers
    /// touching their site
    pub async fn list(&self, session: &Session, query: &TransferQuery) -> AppResult<Vec<TransferDetails>> {
        if session.is_admin() {
            return self.repository.transfers.list_all(query.status).await;
        }
        let site_id = session.require_site()?;
        self.repository.transfers.list_for_site(site_id, query).await
    }

    pub async fn get(&self, session: &Session, id: i32) -> AppResult<TransferDetails> {
        let transfer = self.repository.transfers.get_details(id).await?;
        let involved = session.site_id == Some(transfer.from_site_id)
            || session.site_id == Some(transfer.to_site_id);
        if !session.is_admin() && !involved {
            return Err(AppError::Authorization(
                "Not allowed to view this transfer".to_string(),
            ));
        }
        Ok(transfer)
    }

    pub async fn approve(&self, session: &Session, id: i32, decision: TransferDecision) -> AppResult<EquipmentTransfer> {
        decision.validate()?;
        let transfer = self.repository.transfers.get_by_id(id).await?;
        ensure_can_decide(session, &transfer)?;

        let transfer = self
            .repository
            .transfers
            .approve(id, session.user_id, decision.remarks.as_deref())
            .await?;
        tracing::info!(
            transfer_id = id,
            quantity = transfer.quantity,
            by = %session.user_id,
            "Transfer approved"
        );
        Ok(transfer)
    }

    pub async fn reject(&self, session: &Session, id: i32, decision: TransferDecision) -> AppResult<EquipmentTransfer> {
        decision.validate()?;
        let transfer = self.repository.transfers.get_by_id(id).await?;
        ensure_can_decide(session, &transfer)?;

        let transfer = self
            .repository
            .transfers
            .close(id, TransferStatus::Rejected, session.user_id, decision.remarks.as_deref())
            .await?;
        tracing::info!(transfer_id = id, by = %session.user_id, "Transfer rejected");
        Ok(transfer)
    }

    pub async fn cancel(&self, session: &Session, id: i32) -> AppResult<EquipmentTransfer> {
        let transfer = self.repository.transfers.get_by_id(id).await?;
        if !session.is_admin() && transfer.requested_by != Some(session.user_id) {
            return Err(AppError::Authorization(
                "Only the requester or an admin can cancel this transfer".to_string(),
            ));
        }

        let transfer = self
            .repository
            .transfers
            .close(id, TransferStatus::Cancelled, session.user_id, None)
            .await?;
        tracing::info!(transfer_id = id, by = %session.user_id, "Transfer cancelled");
        Ok(transfer)
    }

    /// Store a photo of the shipment and link it to the transfer
    pub async fn attach_photo(
        &self,
        session: &Session,
        id: i32,
        file_name: Option<&str>,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<EquipmentTransfer> {
        let transfer = self.repository.transfers.get_by_id(id).await?;
        let involved = session.site_id == Some(transfer.from_site_id)
            || session.site_id == Some(transfer.to_site_id);
        if !session.is_admin() && !involved {
            return Err(AppError::Authorization(
                "Not allowed to update this transfer".to_string(),
            ));
        }

        if bytes.is_empty() {
            return Err(AppError::Validation("Photo is empty".to_string()));
        }
        if bytes.len() > self.storage.max_upload_bytes() {
            return Err(AppError::Validation(format!(
                "Photo exceeds {} bytes",
                self.storage.max_upload_bytes()
            )));
        }
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation("Only image uploads are accepted".to_string()));
        }

        let path = transfer_photo_path(file_name);
        let url = self.storage.upload(&path, bytes, content_type).await?;
        let transfer = self.repository.transfers.set_image_url(id, &url).await?;
        tracing::info!(transfer_id = id, path = %path, "Transfer photo attached");
        Ok(transfer)
    }
}

/// The equipment must sit at the source site and hold enough stock
fn check_source(from_site_id: i32, data: &CreateTransfer, equipment: &Equipment) -> AppResult<()> {
    if equipment.site_id != Some(from_site_id) {
        return Err(AppError::BusinessRule(
            "Equipment is not at your site".to_string(),
        ));
    }
    if data.quantity < 1 {
        return Err(AppError::Validation("Quantity must be at least 1".to_string()));
    }
    if data.quantity > equipment.quantity {
        return Err(AppError::InsufficientStock(format!(
            "Requested {} but only {} available",
            data.quantity, equipment.quantity
        )));
    }
    Ok(())
}

/// Admins and the supervisor of the destination site decide transfers
fn ensure_can_decide(session: &Session, transfer: &EquipmentTransfer) -> AppResult<()> {
    if session.is_admin() || session.site_id == Some(transfer.to_site_id) {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Only an admin or the receiving site's supervisor can decide this transfer".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::enums::{EquipmentStatus, Role};

    fn session(role: Role, site_id: Option<i32>) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "sup@example.com".to_string(),
            role,
            site_id,
            username: None,
        }
    }

    fn equipment(site_id: i32, quantity: i32) -> Equipment {
        let now = Utc::now();
        Equipment {
            id: 3,
            name: "Generator".to_string(),
            site_id: Some(site_id),
            quantity,
            is_rental: false,
            status: EquipmentStatus::Available,
            date_bought: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn create(quantity: i32) -> CreateTransfer {
        CreateTransfer {
            equipment_id: 3,
            to_site_id: 2,
            quantity,
            comment: None,
            vehicle_number: Some("KA-01-1234".to_string()),
            remarks: None,
        }
    }

    fn transfer(to_site_id: i32) -> EquipmentTransfer {
        EquipmentTransfer {
            id: 9,
            equipment_id: Some(3),
            equipment_name: "Generator".to_string(),
            is_rental: false,
            from_site_id: 1,
            to_site_id,
            requested_by: None,
            approved_by: None,
            decided_by: None,
            quantity: 2,
            status: TransferStatus::Pending,
            accepted: false,
            comment: None,
            vehicle_number: None,
            remarks: None,
            image_url: None,
            requested_at: Utc::now(),
            decided_at: None,
        }
    }

    #[test]
    fn test_check_source_accepts_valid_quantity() {
        assert!(check_source(1, &create(1), &equipment(1, 4)).is_ok());
        assert!(check_source(1, &create(4), &equipment(1, 4)).is_ok());
    }

    #[test]
    fn test_check_source_rejects_zero_and_oversized() {
        assert!(matches!(
            check_source(1, &create(0), &equipment(1, 4)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            check_source(1, &create(5), &equipment(1, 4)),
            Err(AppError::InsufficientStock(_))
        ));
    }

    #[test]
    fn test_check_source_rejects_equipment_elsewhere() {
        assert!(matches!(
            check_source(1, &create(1), &equipment(7, 4)),
            Err(AppError::BusinessRule(_))
        ));
    }

    #[test]
    fn test_only_admin_or_destination_supervisor_decides() {
        let t = transfer(2);
        assert!(ensure_can_decide(&session(Role::Admin, None), &t).is_ok());
        assert!(ensure_can_decide(&session(Role::Supervisor, Some(2)), &t).is_ok());
        assert!(ensure_can_decide(&session(Role::Supervisor, Some(1)), &t).is_err());
        assert!(ensure_can_decide(&session(Role::Supervisor, None), &t).is_err());
    }
}
