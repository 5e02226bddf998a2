// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::AdminUser,
    models::auth::{CreateUserPayload, UpdateUserPayload, UserPublic},
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "Todos os usuários do portal", body = [UserPublic])),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Json<Vec<UserPublic>> {
    let users = app_state.user_service.list().await;
    Json(users.iter().map(UserPublic::from).collect())
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = UserPublic),
        (status = 409, description = "E-mail já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<UserPublic>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let user = app_state.user_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(UserPublic::from(&user))))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    request_body = UpdateUserPayload,
    params(("id" = String, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário atualizado", body = UserPublic),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<UserPublic>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let user = app_state.user_service.update(&id, payload).await?;
    Ok(Json(UserPublic::from(&user)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário excluído"),
        (status = 403, description = "O usuário master não pode ser excluído")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    app_state.user_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
