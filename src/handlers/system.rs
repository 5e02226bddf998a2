// src/handlers/system.rs

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::AdminUser,
    models::system::PortalSnapshot,
};

// Backup completo do portal em um único JSON.
#[utoipa::path(
    get,
    path = "/api/system/backup",
    tag = "System",
    responses((status = 200, description = "Snapshot completo do portal", body = PortalSnapshot)),
    security(("api_jwt" = []))
)]
pub async fn backup(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Json<PortalSnapshot> {
    Json(app_state.report_service.backup().await)
}

// O restore substitui TODO o estado atual pelo snapshot enviado.
#[utoipa::path(
    post,
    path = "/api/system/restore",
    tag = "System",
    request_body = PortalSnapshot,
    responses((status = 204, description = "Estado restaurado por completo")),
    security(("api_jwt" = []))
)]
pub async fn restore(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(snapshot): Json<PortalSnapshot>,
) -> Result<StatusCode, AppError> {
    app_state.report_service.restore(snapshot).await?;
    Ok(StatusCode::NO_CONTENT)
}
