//! Site-to-site transfer endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Multipart;

use crate::{
    error::{AppError, AppResult},
    models::transfer::{
        CreateTransfer, EquipmentTransfer, TransferDecision, TransferDetails, TransferPhotoUpload,
        TransferQuery,
    },
    AppState,
};

use super::CurrentUser;

/// Transaction log (admin) or the caller's incoming / outgoing transfers
#[utoipa::path(
    get,
    path = "/transfers",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(TransferQuery),
    responses(
        (status = 200, description = "Transfers", body = Vec<TransferDetails>),
        (status = 422, description = "No assigned site")
    )
)]
pub async fn list_transfers(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Query(query): Query<TransferQuery>,
) -> AppResult<Json<Vec<TransferDetails>>> {
    let transfers = state.services.transfers.list(&session, &query).await?;
    Ok(Json(transfers))
}

/// Get a transfer
#[utoipa::path(
    get,
    path = "/transfers/{id}",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Transfer ID")
    ),
    responses(
        (status = 200, description = "Transfer", body = TransferDetails),
        (status = 404, description = "Transfer not found")
    )
)]
pub async fn get_transfer(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TransferDetails>> {
    let transfer = state.services.transfers.get(&session, id).await?;
    Ok(Json(transfer))
}

/// Request a transfer from the caller's site (supervisor)
#[utoipa::path(
    post,
    path = "/transfers",
    tag = "transfers",
    security(("bearer_auth" = [])),
    request_body = CreateTransfer,
    responses(
        (status = 201, description = "Transfer requested", body = EquipmentTransfer),
        (status = 400, description = "Invalid destination or quantity"),
        (status = 422, description = "Equipment not at your site or not enough stock")
    )
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(data): Json<CreateTransfer>,
) -> AppResult<(StatusCode, Json<EquipmentTransfer>)> {
    session.require_supervisor()?;

    let transfer = state.services.transfers.create(&session, data).await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

/// Approve a transfer and move the stock (admin or receiving supervisor)
#[utoipa::path(
    post,
    path = "/transfers/{id}/approve",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Transfer ID")
    ),
    request_body = TransferDecision,
    responses(
        (status = 200, description = "Transfer approved", body = EquipmentTransfer),
        (status = 403, description = "Not allowed to decide"),
        (status = 422, description = "Transfer already decided or not enough stock")
    )
)]
pub async fn approve_transfer(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
    body: Option<Json<TransferDecision>>,
) -> AppResult<Json<EquipmentTransfer>> {
    let decision = body.map(|Json(decision)| decision).unwrap_or_default();
    let transfer = state.services.transfers.approve(&session, id, decision).await?;
    Ok(Json(transfer))
}

/// Reject a transfer (admin or receiving supervisor)
#[utoipa::path(
    post,
    path = "/transfers/{id}/reject",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Transfer ID")
    ),
    request_body = TransferDecision,
    responses(
        (status = 200, description = "Transfer rejected", body = EquipmentTransfer),
        (status = 422, description = "Transfer already decided")
    )
)]
pub async fn reject_transfer(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
    body: Option<Json<TransferDecision>>,
) -> AppResult<Json<EquipmentTransfer>> {
    let decision = body.map(|Json(decision)| decision).unwrap_or_default();
    let transfer = state.services.transfers.reject(&session, id, decision).await?;
    Ok(Json(transfer))
}

/// Cancel a pending transfer (requester or admin)
#[utoipa::path(
    post,
    path = "/transfers/{id}/cancel",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Transfer ID")
    ),
    responses(
        (status = 200, description = "Transfer cancelled", body = EquipmentTransfer),
        (status = 422, description = "Transfer already decided")
    )
)]
pub async fn cancel_transfer(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<EquipmentTransfer>> {
    let transfer = state.services.transfers.cancel(&session, id).await?;
    Ok(Json(transfer))
}

/// Attach a photo of the shipment
#[utoipa::path(
    post,
    path = "/transfers/{id}/photo",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Transfer ID")
    ),
    request_body(content = TransferPhotoUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo stored", body = EquipmentTransfer),
        (status = 400, description = "Missing or invalid photo"),
        (status = 502, description = "Storage upload failed")
    )
)]
pub async fn upload_photo(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> AppResult<Json<EquipmentTransfer>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("photo") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read photo: {}", e)))?;

        let transfer = state
            .services
            .transfers
            .attach_photo(&session, id, file_name.as_deref(), &content_type, bytes.to_vec())
            .await?;
        return Ok(Json(transfer));
    }

    Err(AppError::BadRequest("Missing 'photo' field".to_string()))
}
