//! Dashboard and statistics views

use serde::Serialize;
use utoipa::ToSchema;

use super::{site::ConstructionSite, transfer::TransferDetails};
use crate::inventory::NamedCount;

/// Stock of one site split into owned and rented equipment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SiteInventory {
    pub site_id: i32,
    pub owned: Vec<NamedCount>,
    pub rental: Vec<NamedCount>,
}

/// Everything a supervisor sees on the landing page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupervisorDashboard {
    pub site: Option<ConstructionSite>,
    pub owned: Vec<NamedCount>,
    pub rental: Vec<NamedCount>,
    /// Pending transfers heading to this site
    pub incoming: Vec<TransferDetails>,
    pub outgoing: Vec<TransferDetails>,
}

/// Global counters for the admin dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsResponse {
    pub sites: i64,
    pub admins: i64,
    pub supervisors: i64,
    pub owned_quantity: i64,
    pub rental_quantity: i64,
    pub pending_requests: i64,
    pub pending_transfers: i64,
}
