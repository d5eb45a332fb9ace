//! Dashboard and statistics endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::dashboard::{StatsResponse, SupervisorDashboard},
    AppState,
};

use super::CurrentUser;

/// Supervisor landing page: site, stock and pending transfers
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Supervisor dashboard", body = SupervisorDashboard),
        (status = 403, description = "Supervisor only")
    )
)]
pub async fn supervisor_dashboard(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> AppResult<Json<SupervisorDashboard>> {
    session.require_supervisor()?;

    let dashboard = state.services.dashboard.supervisor(&session).await?;
    Ok(Json(dashboard))
}

/// Global counters (admin only)
#[utoipa::path(
    get,
    path = "/stats",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Statistics", body = StatsResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn stats(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> AppResult<Json<StatsResponse>> {
    session.require_admin()?;

    let stats = state.services.dashboard.stats().await?;
    Ok(Json(stats))
}
