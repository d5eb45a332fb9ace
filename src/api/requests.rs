//! Equipment request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::request::{
        CreateEquipmentRequest, EquipmentRequest, EquipmentRequestDetails, RequestQuery,
        UpdateEquipmentRequest,
    },
    AppState,
};

use super::CurrentUser;

/// List requests, newest first
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "Requests visible to the caller", body = Vec<EquipmentRequestDetails>)
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<Vec<EquipmentRequestDetails>>> {
    let requests = state.services.requests.list(&session, &query).await?;
    Ok(Json(requests))
}

/// Get a request
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request", body = EquipmentRequest),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<EquipmentRequest>> {
    let request = state.services.requests.get(&session, id).await?;
    Ok(Json(request))
}

/// File a buy / sell / rent / return request (supervisor)
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateEquipmentRequest,
    responses(
        (status = 201, description = "Request created", body = EquipmentRequest),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Supervisor only"),
        (status = 422, description = "No assigned site or not enough stock")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(data): Json<CreateEquipmentRequest>,
) -> AppResult<(StatusCode, Json<EquipmentRequest>)> {
    session.require_supervisor()?;

    let request = state.services.requests.create(&session, data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Edit a pending request (admin only)
#[utoipa::path(
    put,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    request_body = UpdateEquipmentRequest,
    responses(
        (status = 200, description = "Request updated", body = EquipmentRequest),
        (status = 422, description = "Request already decided or field not editable for its type")
    )
)]
pub async fn update_request(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateEquipmentRequest>,
) -> AppResult<Json<EquipmentRequest>> {
    session.require_admin()?;

    let request = state.services.requests.update(id, data).await?;
    Ok(Json(request))
}

/// Approve a request and apply its stock change (admin only)
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request approved", body = EquipmentRequest),
        (status = 422, description = "Request already decided or not enough stock")
    )
)]
pub async fn approve_request(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<EquipmentRequest>> {
    session.require_admin()?;

    let request = state.services.requests.approve(&session, id).await?;
    Ok(Json(request))
}

/// Reject a request (admin only)
#[utoipa::path(
    post,
    path = "/requests/{id}/reject",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request rejected", body = EquipmentRequest),
        (status = 422, description = "Request already decided")
    )
)]
pub async fn reject_request(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<EquipmentRequest>> {
    session.require_admin()?;

    let request = state.services.requests.reject(&session, id).await?;
    Ok(Json(request))
}
