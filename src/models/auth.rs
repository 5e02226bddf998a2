// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Id reservado do administrador master, criado no primeiro uso do portal.
/// Esse usuário nunca pode ser excluído.
pub const MASTER_ADMIN_ID: &str = "admin-master";

/// Perfis de acesso do portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,   // Fiscal / Master (controle total)
    Manager, // Gestor de Setor
    User,    // Colaborador (apenas envio)
}

// Representa um usuário como guardado no snapshot do portal.
// O hash da senha participa da (de)serialização para que o backup/restore
// preserve as credenciais; respostas da API usam `UserPublic`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    // Obrigatório para MANAGER/USER; irrelevante para ADMIN.
    #[serde(default)]
    pub sector: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// Projeção do usuário sem credenciais, usada em todas as respostas da API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            sector: user.sector.clone(),
        }
    }
}

// Dados para login. O identificador pode ser o e-mail (sem diferenciar
// maiúsculas) ou o id interno do usuário.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Informe o usuário ou e-mail."))]
    pub identifier: String,
    #[validate(length(min = 1, message = "Informe a senha."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    // "E-mail / Usuário": o master usa um login curto, então não exigimos
    // formato de e-mail aqui.
    #[validate(length(min = 1, message = "O e-mail ou usuário é obrigatório."))]
    pub email: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
    pub role: UserRole,
    pub sector: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "O e-mail ou usuário é obrigatório."))]
    pub email: String,
    // Quando ausente, a senha atual é mantida.
    pub password: Option<String>,
    pub role: UserRole,
    pub sector: Option<String>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (ID do usuário)
    pub exp: usize,  // Expiration time (quando o token expira)
    pub iat: usize,  // Issued At (quando o token foi criado)
}
