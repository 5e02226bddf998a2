// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, models::auth::User};

// O guardião das rotas do fiscal. O portal só tem um gate de perfil (ADMIN),
// então o extrator lê o usuário que o auth_guard deixou na requisição e
// barra quem não for administrador.
pub struct AdminUser(pub User);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        if !user.is_admin() {
            return Err(AppError::AdminOnly);
        }
        Ok(AdminUser(user))
    }
}
