//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::EquipmentStatus;

/// Equipment row. Several rows may share (name, site, rental); they are
/// shown as one inventory line.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    pub site_id: Option<i32>,
    pub quantity: i32,
    pub is_rental: bool,
    pub status: EquipmentStatus,
    pub date_bought: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Equipment row joined with its site name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentWithSite {
    pub id: i32,
    pub name: String,
    pub site_id: Option<i32>,
    pub site_name: Option<String>,
    pub quantity: i32,
    pub is_rental: bool,
}

/// Inventory listing filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct InventoryQuery {
    pub site_id: Option<i32>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub site_id: Option<i32>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[serde(default)]
    pub is_rental: bool,
    pub status: Option<EquipmentStatus>,
    pub date_bought: Option<DateTime<Utc>>,
}

/// Update equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    pub site_id: Option<i32>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
    pub is_rental: Option<bool>,
    pub status: Option<EquipmentStatus>,
}

/// Edit a whole inventory line: new total and site for every row in `ids`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipmentGroup {
    #[validate(length(min = 1, message = "At least one equipment id is required"))]
    pub ids: Vec<i32>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub site_id: Option<i32>,
}

/// Delete every row of an inventory line
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteEquipmentGroup {
    #[validate(length(min = 1, message = "At least one equipment id is required"))]
    pub ids: Vec<i32>,
}

/// Email the inventory table
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ExportInventory {
    #[validate(email(message = "Invalid email format"))]
    pub recipient: String,
    /// Restrict the export to one site
    pub site_id: Option<i32>,
}

/// Result of a group delete
#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedCount {
    pub deleted: u64,
}
