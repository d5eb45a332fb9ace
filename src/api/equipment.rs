//! Equipment inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    inventory::InventoryLine,
    models::equipment::{
        CreateEquipment, DeleteEquipmentGroup, DeletedCount, Equipment, ExportInventory,
        InventoryQuery, UpdateEquipment, UpdateEquipmentGroup,
    },
    AppState,
};

use super::CurrentUser;

/// All inventory grouped by name, site and rental flag
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(InventoryQuery),
    responses(
        (status = 200, description = "Inventory lines", body = Vec<InventoryLine>),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Query(query): Query<InventoryQuery>,
) -> AppResult<Json<Vec<InventoryLine>>> {
    session.require_admin()?;

    let lines = state.services.equipment.list_lines(query.site_id).await?;
    Ok(Json(lines))
}

/// Get one equipment row
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Equipment row", body = Equipment),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.get(id).await?;
    if let Some(site_id) = equipment.site_id {
        session.require_site_access(site_id)?;
    } else {
        session.require_admin()?;
    }
    Ok(Json(equipment))
}

/// Create an equipment row (admin only)
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(data): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    session.require_admin()?;

    let equipment = state.services.equipment.create(data).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update an equipment row (admin only)
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID")
    ),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    session.require_admin()?;

    let equipment = state.services.equipment.update(id, data).await?;
    Ok(Json(equipment))
}

/// Delete an equipment row (admin only)
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID")
    ),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    session.require_admin()?;

    state.services.equipment.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set the total quantity and site of an inventory line (admin only)
#[utoipa::path(
    put,
    path = "/equipment/group",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = UpdateEquipmentGroup,
    responses(
        (status = 200, description = "Rows after redistribution", body = Vec<Equipment>),
        (status = 404, description = "Equipment or site not found")
    )
)]
pub async fn update_group(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(data): Json<UpdateEquipmentGroup>,
) -> AppResult<Json<Vec<Equipment>>> {
    session.require_admin()?;

    let rows = state.services.equipment.update_group(data).await?;
    Ok(Json(rows))
}

/// Delete every row of an inventory line (admin only)
#[utoipa::path(
    post,
    path = "/equipment/group/delete",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = DeleteEquipmentGroup,
    responses(
        (status = 200, description = "Rows deleted", body = DeletedCount)
    )
)]
pub async fn delete_group(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(data): Json<DeleteEquipmentGroup>,
) -> AppResult<Json<DeletedCount>> {
    session.require_admin()?;

    let deleted = state.services.equipment.delete_group(&session, data).await?;
    Ok(Json(DeletedCount { deleted }))
}

/// Email the inventory as an HTML table (admin only)
#[utoipa::path(
    post,
    path = "/equipment/export",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = ExportInventory,
    responses(
        (status = 202, description = "Inventory sent"),
        (status = 502, description = "Email delivery failed")
    )
)]
pub async fn export_inventory(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(data): Json<ExportInventory>,
) -> AppResult<StatusCode> {
    session.require_admin()?;

    state.services.equipment.export(data).await?;
    Ok(StatusCode::ACCEPTED)
}
