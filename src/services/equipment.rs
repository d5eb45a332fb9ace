//! Equipment inventory service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    inventory::{count_by_name, distribute_quantity, group_lines, render_html_table, InventoryLine},
    models::{
        dashboard::SiteInventory,
        equipment::{
            CreateEquipment, DeleteEquipmentGroup, Equipment, ExportInventory, UpdateEquipment,
            UpdateEquipmentGroup,
        },
        user::Session,
    },
    repository::Repository,
    services::email::EmailService,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
    email: EmailService,
}

impl EquipmentService {
    pub fn new(repository: Repository, email: EmailService) -> Self {
        Self { repository, email }
    }

    /// All inventory lines, optionally for a single site
    pub async fn list_lines(&self, site_id: Option<i32>) -> AppResult<Vec<InventoryLine>> {
        let rows = self.repository.equipment.list_with_sites(site_id).await?;
        Ok(group_lines(&rows))
    }

    /// Stock of one site by name, owned and rental apart
    pub async fn site_inventory(&self, session: &Session, site_id: i32) -> AppResult<SiteInventory> {
        session.require_site_access(site_id)?;
        if !self.repository.sites.exists(site_id).await? {
            return Err(AppError::NotFound(format!("Site {} not found", site_id)));
        }

        let rows = self.repository.equipment.list_by_site(site_id).await?;
        Ok(SiteInventory {
            site_id,
            owned: count_by_name(&rows, false),
            rental: count_by_name(&rows, true),
        })
    }

    pub async fn get(&self, id: i32) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await
    }

    pub async fn create(&self, data: CreateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        self.ensure_site(data.site_id).await?;
        self.repository.equipment.create(&data).await
    }

    pub async fn update(&self, id: i32, data: UpdateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        self.ensure_site(data.site_id).await?;
        self.repository.equipment.update(id, &data).await
    }

    pub async fn delete(&self, session: &Session, id: i32) -> AppResult<()> {
        self.repository.equipment.delete(id).await?;
        tracing::info!(equipment_id = id, by = %session.user_id, "Equipment deleted");
        Ok(())
    }

    /// Set a new total and site for an inventory line, spreading the total
    /// over its rows
    pub async fn update_group(&self, data: UpdateEquipmentGroup) -> AppResult<Vec<Equipment>> {
        data.validate()?;
        self.ensure_site(data.site_id).await?;

        let ids = dedup_ids(&data.ids);
        let quantities = distribute_quantity(data.quantity, ids.len())?;
        self.repository
            .equipment
            .update_group(&ids, &quantities, data.site_id)
            .await
    }

    pub async fn delete_group(&self, session: &Session, data: DeleteEquipmentGroup) -> AppResult<u64> {
        data.validate()?;
        let ids = dedup_ids(&data.ids);
        let deleted = self.repository.equipment.delete_group(&ids).await?;
        tracing::info!(count = deleted, by = %session.user_id, "Equipment group deleted");
        Ok(deleted)
    }

    /// Email the grouped inventory as an HTML table
    pub async fn export(&self, data: ExportInventory) -> AppResult<()> {
        data.validate()?;

        let lines = self.list_lines(data.site_id).await?;
        let title = match data.site_id {
            Some(site_id) => {
                let site = self.repository.sites.get_by_id(site_id).await?;
                format!("Inventory - {}", site.site_name)
            }
            None => "Inventory - all sites".to_string(),
        };

        let html = render_html_table(&title, &lines);
        self.email.send_html(data.recipient.trim(), &title, &html).await?;
        tracing::info!(lines = lines.len(), "Inventory exported by email");
        Ok(())
    }

    async fn ensure_site(&self, site_id: Option<i32>) -> AppResult<()> {
        match site_id {
            Some(id) if !self.repository.sites.exists(id).await? => {
                Err(AppError::NotFound(format!("Site {} not found", id)))
            }
            _ => Ok(()),
        }
    }
}

fn dedup_ids(ids: &[i32]) -> Vec<i32> {
    let mut out: Vec<i32> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_ids_keeps_first_occurrence() {
        assert_eq!(dedup_ids(&[4, 2, 4, 9, 2]), vec![4, 2, 9]);
        assert!(dedup_ids(&[]).is_empty());
    }
}
