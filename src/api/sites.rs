//! Construction site endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        dashboard::SiteInventory,
        site::{AssignSupervisor, CreateSite, SiteDetails},
    },
    AppState,
};

use super::CurrentUser;

/// List sites with their supervisors
#[utoipa::path(
    get,
    path = "/sites",
    tag = "sites",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All sites", body = Vec<SiteDetails>)
    )
)]
pub async fn list_sites(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
) -> AppResult<Json<Vec<SiteDetails>>> {
    let sites = state.services.sites.list().await?;
    Ok(Json(sites))
}

/// Get a site
#[utoipa::path(
    get,
    path = "/sites/{id}",
    tag = "sites",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Site ID")
    ),
    responses(
        (status = 200, description = "Site details", body = SiteDetails),
        (status = 404, description = "Site not found")
    )
)]
pub async fn get_site(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<SiteDetails>> {
    let site = state.services.sites.get(id).await?;
    Ok(Json(site))
}

/// Create a site (admin only)
#[utoipa::path(
    post,
    path = "/sites",
    tag = "sites",
    security(("bearer_auth" = [])),
    request_body = CreateSite,
    responses(
        (status = 201, description = "Site created", body = SiteDetails),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn create_site(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(data): Json<CreateSite>,
) -> AppResult<(StatusCode, Json<SiteDetails>)> {
    session.require_admin()?;

    let site = state.services.sites.create(&session, data).await?;
    Ok((StatusCode::CREATED, Json(site)))
}

/// Delete a site (admin only)
#[utoipa::path(
    delete,
    path = "/sites/{id}",
    tag = "sites",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Site ID")
    ),
    responses(
        (status = 204, description = "Site deleted"),
        (status = 404, description = "Site not found"),
        (status = 409, description = "Site still holds equipment or transfers")
    )
)]
pub async fn delete_site(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    session.require_admin()?;

    state.services.sites.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assign the supervisor of a site (admin only)
#[utoipa::path(
    put,
    path = "/sites/{id}/supervisor",
    tag = "sites",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Site ID")
    ),
    request_body = AssignSupervisor,
    responses(
        (status = 200, description = "Supervisor assigned", body = SiteDetails),
        (status = 404, description = "Site or user not found"),
        (status = 422, description = "User is not a supervisor")
    )
)]
pub async fn assign_supervisor(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
    Json(body): Json<AssignSupervisor>,
) -> AppResult<Json<SiteDetails>> {
    session.require_admin()?;

    let site = state
        .services
        .sites
        .assign_supervisor(&session, id, body.supervisor_id)
        .await?;
    Ok(Json(site))
}

/// Stock of a site by name, owned and rental apart
#[utoipa::path(
    get,
    path = "/sites/{id}/inventory",
    tag = "sites",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Site ID")
    ),
    responses(
        (status = 200, description = "Site inventory", body = SiteInventory),
        (status = 403, description = "Not your site")
    )
)]
pub async fn site_inventory(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<SiteInventory>> {
    let inventory = state.services.equipment.site_inventory(&session, id).await?;
    Ok(Json(inventory))
}
