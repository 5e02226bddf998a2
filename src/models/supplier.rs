// src/models/supplier.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Cadastro de fornecedores: dados de referência usados para pré-preencher
// notas. Não participa do fluxo de revisão.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,

    // Nome Fantasia
    pub name: String,
    pub razao_social: String,
    pub cnpj: String,

    #[serde(default)]
    pub endereco: String,
    #[serde(default)]
    pub numero: String,
    #[serde(default)]
    pub complemento: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub uf: String,
    #[serde(default)]
    pub cep: String,

    #[serde(default)]
    pub contact_email: Option<String>,

    pub active: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierPayload {
    #[validate(length(min = 1, message = "O nome fantasia é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "A razão social é obrigatória."))]
    pub razao_social: String,
    #[validate(length(min = 1, message = "O CNPJ é obrigatório."))]
    pub cnpj: String,

    #[serde(default)]
    pub endereco: String,
    #[serde(default)]
    pub numero: String,
    #[serde(default)]
    pub complemento: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub uf: String,
    #[serde(default)]
    pub cep: String,

    pub contact_email: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierPayload {
    pub name: Option<String>,
    pub razao_social: Option<String>,
    pub cnpj: Option<String>,
    pub endereco: Option<String>,
    pub numero: Option<String>,
    pub complemento: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub uf: Option<String>,
    pub cep: Option<String>,
    pub contact_email: Option<String>,
    pub active: Option<bool>,
}
