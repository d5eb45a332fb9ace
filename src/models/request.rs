//! Equipment request (buy / sell / rent / return) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{RequestStatus, RequestType};
use crate::error::AppError;

/// Equipment request row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentRequest {
    pub id: i32,
    pub site_id: i32,
    pub supervisor_id: Option<Uuid>,
    pub request_type: RequestType,
    pub equipment_id: Option<i32>,
    pub equipment_name: Option<String>,
    pub quantity: i32,
    pub is_rental: bool,
    pub status: RequestStatus,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request joined with site, supervisor and equipment names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentRequestDetails {
    pub id: i32,
    pub site_id: i32,
    pub site_name: Option<String>,
    pub supervisor_id: Option<Uuid>,
    pub supervisor_username: Option<String>,
    pub supervisor_email: Option<String>,
    pub request_type: RequestType,
    pub equipment_id: Option<i32>,
    /// Name typed on the request, or the referenced row's name
    pub equipment_name: Option<String>,
    pub quantity: i32,
    pub is_rental: bool,
    pub status: RequestStatus,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Create request (supervisor)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipmentRequest {
    pub request_type: RequestType,
    /// Existing equipment row (required for sell / rent / return)
    pub equipment_id: Option<i32>,
    /// Equipment name (required for buy)
    #[validate(length(min = 1, max = 200, message = "Equipment name must be 1-200 characters"))]
    pub equipment_name: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[serde(default)]
    pub is_rental: bool,
}

/// Edit a pending request (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipmentRequest {
    #[validate(length(min = 1, max = 200, message = "Equipment name must be 1-200 characters"))]
    pub equipment_name: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
    pub is_rental: Option<bool>,
}

impl UpdateEquipmentRequest {
    /// Name and rental flag only describe what a buy request brings in;
    /// the other types are bound to an existing row.
    pub fn check_against(&self, request_type: RequestType) -> Result<(), AppError> {
        if !request_type.adds_stock() && (self.equipment_name.is_some() || self.is_rental.is_some()) {
            return Err(AppError::BusinessRule(format!(
                "Only the quantity of a {} request can be edited",
                request_type
            )));
        }
        Ok(())
    }
}

/// Request listing filter
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(name: Option<&str>, quantity: Option<i32>, is_rental: Option<bool>) -> UpdateEquipmentRequest {
        UpdateEquipmentRequest {
            equipment_name: name.map(str::to_string),
            quantity,
            is_rental,
        }
    }

    #[test]
    fn test_buy_edits_any_field() {
        assert!(edit(Some("Crane"), Some(2), Some(true))
            .check_against(RequestType::Buy)
            .is_ok());
    }

    #[test]
    fn test_stock_out_edits_quantity_only() {
        for request_type in [RequestType::Sell, RequestType::Rent, RequestType::Return] {
            assert!(edit(None, Some(2), None).check_against(request_type).is_ok());
            assert!(matches!(
                edit(Some("Other"), None, None).check_against(request_type),
                Err(AppError::BusinessRule(_))
            ));
            assert!(matches!(
                edit(None, None, Some(true)).check_against(request_type),
                Err(AppError::BusinessRule(_))
            ));
        }
    }
}
