// src/models/invoice.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums ---

/// Ciclo de vida de uma nota no portal: nasce em análise, e o fiscal
/// confirma o recebimento ou devolve como pendência para o autor corrigir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    InReview, // Em análise (estado inicial)
    Received, // Recebida (trava edição/exclusão por não-admin)
    Pending,  // Pendente (aguardando correção do autor)
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InvoiceStatus::InReview => "IN_REVIEW",
            InvoiceStatus::Received => "RECEIVED",
            InvoiceStatus::Pending => "PENDING",
        };
        f.write_str(name)
    }
}

/// Tipo de vínculo da nota com a compra.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocType {
    #[default]
    Osv,
    Contract,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,

    #[serde(default)]
    pub supplier_id: Option<Uuid>,
    pub supplier_name: String,
    #[serde(default)]
    pub supplier_cnpj: Option<String>,

    pub invoice_number: String,
    #[schema(value_type = String, format = Date, example = "2024-03-15")]
    pub emission_date: NaiveDate,
    pub order_number: String,

    #[schema(example = "1500.50")]
    pub value: Decimal,
    pub doc_type: DocType,
    pub status: InvoiceStatus,

    // Quem postou e em qual setor estava naquele momento. O setor é uma
    // fotografia histórica: não acompanha edições posteriores do usuário.
    pub uploaded_by: String,
    pub user_name: String,
    pub user_sector: String,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub observations: Option<String>,
    // Motivo registrado pelo fiscal quando a nota vira pendência.
    #[serde(default)]
    pub admin_observations: Option<String>,
    // Resposta do autor ao repostar uma pendência.
    #[serde(default)]
    pub user_response: Option<String>,

    pub file_name: String,
    #[serde(default)]
    pub attachment_id: Option<Uuid>,
}

// Validação customizada para valores monetários.
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoicePayload {
    pub supplier_id: Option<Uuid>,

    #[validate(length(min = 1, message = "A razão social do fornecedor é obrigatória."))]
    pub supplier_name: String,

    pub supplier_cnpj: Option<String>,

    #[validate(length(min = 1, message = "O número da nota fiscal é obrigatório."))]
    pub invoice_number: String,

    #[schema(value_type = String, format = Date, example = "2024-03-15")]
    pub emission_date: NaiveDate,

    #[validate(length(min = 1, message = "O número do pedido/OS é obrigatório."))]
    pub order_number: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub value: Decimal,

    #[serde(default)]
    pub doc_type: DocType,

    pub observations: Option<String>,

    #[validate(length(min = 1, message = "O nome do arquivo é obrigatório."))]
    pub file_name: String,

    // Conteúdo do anexo em base64 (o portal guarda o comprovante original).
    #[validate(length(min = 1, message = "O anexo da nota é obrigatório."))]
    pub file_base64: String,
}

// Edição dos campos de dados da nota. Status, autor e fotografias de
// postagem nunca passam por aqui.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoicePayload {
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,
    pub supplier_cnpj: Option<String>,
    pub invoice_number: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub emission_date: Option<NaiveDate>,
    pub order_number: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub value: Option<Decimal>,
    pub doc_type: Option<DocType>,
    pub observations: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusPayload {
    pub status: InvoiceStatus,
    // Obrigatório ao marcar pendência.
    pub admin_observations: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepostPayload {
    pub user_response: Option<String>,
}

// Filtros de busca da listagem. Campo vazio/ausente aceita tudo.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InvoiceFilter {
    pub supplier_name: Option<String>,
    pub invoice_number: Option<String>,
    pub user_name: Option<String>,
    pub sector: Option<String>,
    #[param(value_type = Option<String>, example = "2024-01-01")]
    pub emission_from: Option<NaiveDate>,
    #[param(value_type = Option<String>)]
    pub emission_to: Option<NaiveDate>,
    #[param(value_type = Option<String>)]
    pub posted_from: Option<NaiveDate>,
    #[param(value_type = Option<String>)]
    pub posted_to: Option<NaiveDate>,
}
