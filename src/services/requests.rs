//! Equipment request workflow (buy / sell / rent / return)

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RequestType,
        equipment::Equipment,
        request::{
            CreateEquipmentRequest, EquipmentRequest, EquipmentRequestDetails, RequestQuery,
            UpdateEquipmentRequest,
        },
        user::Session,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// File a request for the supervisor's own site
    pub async fn create(&self, session: &Session, data: CreateEquipmentRequest) -> AppResult<EquipmentRequest> {
        let site_id = session.require_site()?;
        data.validate()?;

        let equipment = match (data.request_type.adds_stock(), data.equipment_id) {
            (false, Some(id)) => Some(self.repository.equipment.get_by_id(id).await?),
            _ => None,
        };
        let data = prepare_request(site_id, data, equipment.as_ref())?;

        let request = self
            .repository
            .requests
            .create(site_id, session.user_id, &data)
            .await?;
        tracing::info!(
            request_id = request.id,
            request_type = %request.request_type,
            site_id,
            "Equipment request created"
        );
        Ok(request)
    }

    /// Admins see every request, supervisors only their own
    pub async fn list(&self, session: &Session, query: &RequestQuery) -> AppResult<Vec<EquipmentRequestDetails>> {
        let supervisor = if session.is_admin() { None } else { Some(session.user_id) };
        self.repository.requests.list(query, supervisor).await
    }

    pub async fn get(&self, session: &Session, id: i32) -> AppResult<EquipmentRequest> {
        let request = self.repository.requests.get_by_id(id).await?;
        if !session.is_admin() && request.supervisor_id != Some(session.user_id) {
            return Err(AppError::Authorization(
                "Not allowed to view this request".to_string(),
            ));
        }
        Ok(request)
    }

    pub async fn update(&self, id: i32, data: UpdateEquipmentRequest) -> AppResult<EquipmentRequest> {
        data.validate()?;
        self.repository.requests.update_pending(id, &data).await
    }

    pub async fn approve(&self, session: &Session, id: i32) -> AppResult<EquipmentRequest> {
        let request = self.repository.requests.approve(id, session.user_id).await?;
        tracing::info!(
            request_id = id,
            request_type = %request.request_type,
            quantity = request.quantity,
            by = %session.user_id,
            "Equipment request approved"
        );
        Ok(request)
    }

    pub async fn reject(&self, session: &Session, id: i32) -> AppResult<EquipmentRequest> {
        let request = self.repository.requests.reject(id, session.user_id).await?;
        tracing::info!(request_id = id, by = %session.user_id, "Equipment request rejected");
        Ok(request)
    }
}

/// Check a new request against its type and fill in what the referenced
/// row implies. buy needs a name; sell / rent / return need a row held by
/// the requesting site with enough stock.
fn prepare_request(
    site_id: i32,
    data: CreateEquipmentRequest,
    equipment: Option<&Equipment>,
) -> AppResult<CreateEquipmentRequest> {
    match data.request_type {
        RequestType::Buy => {
            let name = data
                .equipment_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "Equipment name is required for a {} request",
                        data.request_type
                    ))
                })?
                .to_string();

            Ok(CreateEquipmentRequest {
                equipment_id: None,
                equipment_name: Some(name),
                ..data
            })
        }
        RequestType::Sell | RequestType::Rent | RequestType::Return => {
            let equipment = equipment.ok_or_else(|| {
                AppError::Validation(format!(
                    "Equipment is required for a {} request",
                    data.request_type
                ))
            })?;

            if equipment.site_id != Some(site_id) {
                return Err(AppError::BusinessRule(
                    "Equipment is not at your site".to_string(),
                ));
            }
            if data.quantity > equipment.quantity {
                return Err(AppError::InsufficientStock(format!(
                    "Requested {} but only {} available",
                    data.quantity, equipment.quantity
                )));
            }

            Ok(CreateEquipmentRequest {
                equipment_id: Some(equipment.id),
                equipment_name: Some(equipment.name.clone()),
                is_rental: equipment.is_rental,
                ..data
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::enums::EquipmentStatus;

    fn request(request_type: RequestType, name: Option<&str>, equipment_id: Option<i32>, quantity: i32) -> CreateEquipmentRequest {
        CreateEquipmentRequest {
            request_type,
            equipment_id,
            equipment_name: name.map(str::to_string),
            quantity,
            is_rental: false,
        }
    }

    fn equipment(site_id: i32, quantity: i32, is_rental: bool) -> Equipment {
        let now = Utc::now();
        Equipment {
            id: 11,
            name: "Scaffold".to_string(),
            site_id: Some(site_id),
            quantity,
            is_rental,
            status: EquipmentStatus::Available,
            date_bought: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_buy_requires_name() {
        let result = prepare_request(1, request(RequestType::Buy, Some("   "), None, 2), None);
        assert!(matches!(result, Err(AppError::Validation(_))));

        let prepared = prepare_request(1, request(RequestType::Buy, Some(" Drill "), None, 2), None).unwrap();
        assert_eq!(prepared.equipment_name.as_deref(), Some("Drill"));
        assert!(!prepared.is_rental);
    }

    #[test]
    fn test_buy_keeps_rental_flag() {
        let mut data = request(RequestType::Buy, Some("Crane"), Some(11), 1);
        data.is_rental = true;
        let prepared = prepare_request(1, data, None).unwrap();
        assert!(prepared.is_rental);
        assert_eq!(prepared.equipment_id, None);
    }

    #[test]
    fn test_rent_draws_on_existing_row() {
        let result = prepare_request(1, request(RequestType::Rent, Some("Crane"), None, 1), None);
        assert!(matches!(result, Err(AppError::Validation(_))));

        let here = equipment(1, 4, false);
        let prepared = prepare_request(1, request(RequestType::Rent, None, Some(11), 2), Some(&here)).unwrap();
        assert_eq!(prepared.equipment_id, Some(11));
        assert_eq!(prepared.equipment_name.as_deref(), Some("Scaffold"));

        let result = prepare_request(1, request(RequestType::Rent, None, Some(11), 5), Some(&here));
        assert!(matches!(result, Err(AppError::InsufficientStock(_))));
    }

    #[test]
    fn test_sell_requires_equipment_at_own_site() {
        let result = prepare_request(1, request(RequestType::Sell, None, None, 1), None);
        assert!(matches!(result, Err(AppError::Validation(_))));

        let elsewhere = equipment(2, 5, false);
        let result = prepare_request(1, request(RequestType::Sell, None, Some(11), 1), Some(&elsewhere));
        assert!(matches!(result, Err(AppError::BusinessRule(_))));

        let here = equipment(1, 5, false);
        let prepared = prepare_request(1, request(RequestType::Sell, None, Some(11), 5), Some(&here)).unwrap();
        assert_eq!(prepared.equipment_id, Some(11));
        assert_eq!(prepared.equipment_name.as_deref(), Some("Scaffold"));
    }

    #[test]
    fn test_sell_rejects_oversized_quantity() {
        let here = equipment(1, 3, false);
        let result = prepare_request(1, request(RequestType::Sell, None, Some(11), 4), Some(&here));
        assert!(matches!(result, Err(AppError::InsufficientStock(_))));
    }

    #[test]
    fn test_return_copies_rental_flag() {
        let rented = equipment(1, 3, true);
        let prepared = prepare_request(1, request(RequestType::Return, None, Some(11), 1), Some(&rented)).unwrap();
        assert!(prepared.is_rental);
    }
}
