use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::invoice::InvoiceStatus;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Nota não encontrada")]
    InvoiceNotFound,

    #[error("Fornecedor não encontrado")]
    SupplierNotFound,

    #[error("Anexo não encontrado")]
    AttachmentNotFound,

    // Guardas de permissão do fluxo de revisão (ver services/review.rs)
    #[error("Ação permitida apenas para administradores")]
    AdminOnly,

    #[error("Apenas o autor da nota pode realizar esta ação")]
    NotRecordAuthor,

    #[error("Nota recebida está bloqueada")]
    RecordLocked,

    #[error("Transição de status não permitida: {0} -> {1}")]
    InvalidStatusTransition(InvoiceStatus, InvoiceStatus),

    #[error("Motivo da pendência ausente")]
    MissingPendingReason,

    #[error("Setor obrigatório para o perfil")]
    SectorRequired,

    #[error("O usuário master não pode ser excluído")]
    MasterUserProtected,

    #[error("Anexo inválido")]
    InvalidAttachment,

    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidStatusTransition(from, to) => {
                let body = Json(json!({
                    "error": format!("Transição de status não permitida: {} -> {}.", from, to),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::InvalidCredentials => {
                // Mensagem genérica: não distinguimos usuário desconhecido de senha errada.
                (StatusCode::UNAUTHORIZED, "Credenciais inválidas. Verifique seu usuário e senha.")
            }
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente."),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "Usuário não encontrado."),
            AppError::InvoiceNotFound => (StatusCode::NOT_FOUND, "Nota não encontrada."),
            AppError::SupplierNotFound => (StatusCode::NOT_FOUND, "Fornecedor não encontrado."),
            AppError::AttachmentNotFound => (StatusCode::NOT_FOUND, "Anexo não encontrado."),
            AppError::AdminOnly => (StatusCode::FORBIDDEN, "Ação permitida apenas para administradores."),
            AppError::NotRecordAuthor => (StatusCode::FORBIDDEN, "Apenas o autor da nota pode realizar esta ação."),
            AppError::RecordLocked => {
                (StatusCode::FORBIDDEN, "Nota recebida está bloqueada para alteração ou exclusão.")
            }
            AppError::MissingPendingReason => {
                (StatusCode::BAD_REQUEST, "Informe o motivo da pendência nas observações.")
            }
            AppError::SectorRequired => {
                (StatusCode::BAD_REQUEST, "Setor é obrigatório para os perfis Gestor e Colaborador.")
            }
            AppError::MasterUserProtected => (StatusCode::FORBIDDEN, "O usuário master não pode ser excluído."),
            AppError::InvalidAttachment => (StatusCode::BAD_REQUEST, "O anexo enviado é inválido."),

            // Todos os outros erros (IoError, InternalServerError, ...) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
