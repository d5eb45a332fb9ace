//! Site-to-site equipment transfer model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::TransferStatus;

/// Equipment transfer row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentTransfer {
    pub id: i32,
    /// Source row; cleared if that row is later deleted
    pub equipment_id: Option<i32>,
    /// Name of the equipment at request time
    pub equipment_name: String,
    pub is_rental: bool,
    pub from_site_id: i32,
    pub to_site_id: i32,
    pub requested_by: Option<Uuid>,
    /// Set only when the transfer was approved
    pub approved_by: Option<Uuid>,
    /// Whoever approved, rejected or cancelled it
    pub decided_by: Option<Uuid>,
    pub quantity: i32,
    pub status: TransferStatus,
    pub accepted: bool,
    pub comment: Option<String>,
    pub vehicle_number: Option<String>,
    pub remarks: Option<String>,
    pub image_url: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Transfer joined with site and requester names (transaction log entry)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TransferDetails {
    pub id: i32,
    pub equipment_id: Option<i32>,
    pub equipment_name: String,
    pub is_rental: bool,
    pub from_site_id: i32,
    pub from_site_name: Option<String>,
    pub to_site_id: i32,
    pub to_site_name: Option<String>,
    pub requested_by: Option<Uuid>,
    pub requested_by_username: Option<String>,
    pub requested_by_email: Option<String>,
    pub quantity: i32,
    pub status: TransferStatus,
    pub accepted: bool,
    pub comment: Option<String>,
    pub vehicle_number: Option<String>,
    pub remarks: Option<String>,
    pub image_url: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Create transfer request (supervisor; source is the supervisor's site)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransfer {
    pub equipment_id: i32,
    pub to_site_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(length(max = 1000, message = "Comment is too long"))]
    pub comment: Option<String>,
    #[validate(length(max = 32, message = "Vehicle number is too long"))]
    pub vehicle_number: Option<String>,
    #[validate(length(max = 1000, message = "Remarks are too long"))]
    pub remarks: Option<String>,
}

/// Which side of a transfer the caller's site is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    Incoming,
    Outgoing,
}

/// Transfer listing filter
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TransferQuery {
    pub status: Option<TransferStatus>,
    /// Supervisors only: restrict to incoming or outgoing transfers
    pub direction: Option<TransferDirection>,
}

/// Optional note recorded when deciding a transfer
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct TransferDecision {
    #[validate(length(max = 1000, message = "Remarks are too long"))]
    pub remarks: Option<String>,
}

/// Multipart body of the photo upload endpoint
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct TransferPhotoUpload {
    #[schema(value_type = String, format = Binary)]
    pub photo: Vec<u8>,
}
