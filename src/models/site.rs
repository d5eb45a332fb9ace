//! Construction site model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Construction site record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ConstructionSite {
    pub id: i32,
    pub site_name: String,
    pub contractor: Option<String>,
    pub supervisor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Site with its assigned supervisor, for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SiteDetails {
    pub id: i32,
    pub site_name: String,
    pub contractor: Option<String>,
    pub supervisor_id: Option<Uuid>,
    pub supervisor_username: Option<String>,
    pub supervisor_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create site request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSite {
    #[validate(length(min = 1, max = 200, message = "Site name must be 1-200 characters"))]
    pub site_name: String,
    pub contractor: Option<String>,
    pub supervisor_id: Option<Uuid>,
}

/// Assign a supervisor to a site
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignSupervisor {
    pub supervisor_id: Uuid,
}
