//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, dashboard, equipment, health, requests, sites, transfers, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sitestock API",
        version = "0.3.0",
        description = "Construction site equipment tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::signup,
        auth::login,
        auth::refresh,
        auth::logout,
        auth::oauth_url,
        auth::complete_signup,
        auth::me,
        auth::update_profile,
        // Users
        users::list_users,
        users::get_user,
        users::update_role,
        users::delete_user,
        // Sites
        sites::list_sites,
        sites::get_site,
        sites::create_site,
        sites::delete_site,
        sites::assign_supervisor,
        sites::site_inventory,
        // Equipment
        equipment::list_inventory,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::update_group,
        equipment::delete_group,
        equipment::export_inventory,
        // Requests
        requests::list_requests,
        requests::get_request,
        requests::create_request,
        requests::update_request,
        requests::approve_request,
        requests::reject_request,
        // Transfers
        transfers::list_transfers,
        transfers::get_transfer,
        transfers::create_transfer,
        transfers::approve_transfer,
        transfers::reject_transfer,
        transfers::cancel_transfer,
        transfers::upload_photo,
        // Dashboard
        dashboard::supervisor_dashboard,
        dashboard::stats,
    ),
    components(
        schemas(
            // Auth
            crate::models::auth::SignupRequest,
            crate::models::auth::LoginRequest,
            crate::models::auth::RefreshRequest,
            crate::models::auth::CompleteSignup,
            crate::models::auth::OAuthUrlResponse,
            crate::models::auth::AuthResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UpdateRole,
            crate::models::user::UpdateProfile,
            crate::models::enums::Role,
            // Sites
            crate::models::site::ConstructionSite,
            crate::models::site::SiteDetails,
            crate::models::site::CreateSite,
            crate::models::site::AssignSupervisor,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::UpdateEquipmentGroup,
            crate::models::equipment::DeleteEquipmentGroup,
            crate::models::equipment::DeletedCount,
            crate::models::equipment::ExportInventory,
            crate::models::enums::EquipmentStatus,
            crate::inventory::InventoryLine,
            crate::inventory::NamedCount,
            // Requests
            crate::models::request::EquipmentRequest,
            crate::models::request::EquipmentRequestDetails,
            crate::models::request::CreateEquipmentRequest,
            crate::models::request::UpdateEquipmentRequest,
            crate::models::enums::RequestType,
            crate::models::enums::RequestStatus,
            // Transfers
            crate::models::transfer::EquipmentTransfer,
            crate::models::transfer::TransferDetails,
            crate::models::transfer::CreateTransfer,
            crate::models::transfer::TransferDecision,
            crate::models::transfer::TransferDirection,
            crate::models::transfer::TransferPhotoUpload,
            crate::models::enums::TransferStatus,
            // Dashboard
            crate::models::dashboard::SiteInventory,
            crate::models::dashboard::SupervisorDashboard,
            crate::models::dashboard::StatsResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Sign-in through the hosted auth service"),
        (name = "users", description = "User management"),
        (name = "sites", description = "Construction sites"),
        (name = "equipment", description = "Equipment inventory"),
        (name = "requests", description = "Buy, sell, rent and return requests"),
        (name = "transfers", description = "Site-to-site transfers"),
        (name = "dashboard", description = "Dashboards and statistics")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
