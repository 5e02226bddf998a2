// src/handlers/suppliers.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::AdminUser},
    models::supplier::{CreateSupplierPayload, Supplier, UpdateSupplierPayload},
};

// Qualquer usuário autenticado lista fornecedores: o cadastro serve para
// pré-preencher o formulário de postagem.
#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Suppliers",
    responses((status = 200, description = "Fornecedores cadastrados", body = [Supplier])),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Json<Vec<Supplier>> {
    Json(app_state.store.list_suppliers().await)
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Suppliers",
    request_body = CreateSupplierPayload,
    responses((status = 201, description = "Fornecedor criado", body = Supplier)),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let supplier = Supplier {
        id: Uuid::new_v4(),
        name: payload.name,
        razao_social: payload.razao_social,
        cnpj: payload.cnpj,
        endereco: payload.endereco,
        numero: payload.numero,
        complemento: payload.complemento,
        bairro: payload.bairro,
        cidade: payload.cidade,
        uf: payload.uf,
        cep: payload.cep,
        contact_email: payload.contact_email,
        active: payload.active,
    };
    let supplier = app_state.store.insert_supplier(supplier).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    request_body = UpdateSupplierPayload,
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "Fornecedor atualizado", body = Supplier),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierPayload>,
) -> Result<Json<Supplier>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let mut supplier = app_state
        .store
        .get_supplier(id)
        .await
        .ok_or(AppError::SupplierNotFound)?;

    if let Some(v) = payload.name {
        supplier.name = v;
    }
    if let Some(v) = payload.razao_social {
        supplier.razao_social = v;
    }
    if let Some(v) = payload.cnpj {
        supplier.cnpj = v;
    }
    if let Some(v) = payload.endereco {
        supplier.endereco = v;
    }
    if let Some(v) = payload.numero {
        supplier.numero = v;
    }
    if let Some(v) = payload.complemento {
        supplier.complemento = v;
    }
    if let Some(v) = payload.bairro {
        supplier.bairro = v;
    }
    if let Some(v) = payload.cidade {
        supplier.cidade = v;
    }
    if let Some(v) = payload.uf {
        supplier.uf = v;
    }
    if let Some(v) = payload.cep {
        supplier.cep = v;
    }
    if let Some(v) = payload.contact_email {
        supplier.contact_email = Some(v);
    }
    if let Some(v) = payload.active {
        supplier.active = v;
    }

    let supplier = app_state.store.update_supplier(supplier).await?;
    Ok(Json(supplier))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses((status = 204, description = "Fornecedor excluído")),
    security(("api_jwt" = []))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.store.delete_supplier(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
