// src/handlers/invoices.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::invoice::{
        CreateInvoicePayload, Invoice, InvoiceFilter, RepostPayload, SetStatusPayload,
        UpdateInvoicePayload,
    },
    services::{ai_service::ExtractedInvoiceFields, invoice_service, report_service},
};

#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Invoices",
    request_body = CreateInvoicePayload,
    responses(
        (status = 201, description = "Nota postada (nasce em análise)", body = Invoice),
        (status = 400, description = "Campos inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateInvoicePayload>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let invoice = app_state.invoice_service.post(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

// A listagem já volta recortada pelo perfil de quem pede e ordenada da
// postagem mais recente para a mais antiga.
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Invoices",
    params(InvoiceFilter),
    responses((status = 200, description = "Notas visíveis ao solicitante", body = [Invoice])),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<InvoiceFilter>,
) -> Json<Vec<Invoice>> {
    Json(app_state.invoice_service.list(&user, &filter).await)
}

#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    request_body = UpdateInvoicePayload,
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota atualizada", body = Invoice),
        (status = 403, description = "Sem permissão para editar")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInvoicePayload>,
) -> Result<Json<Invoice>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let invoice = app_state.invoice_service.update(&user, id, payload).await?;
    Ok(Json(invoice))
}

#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 204, description = "Nota excluída"),
        (status = 403, description = "Nota recebida está bloqueada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.invoice_service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Transições do fiscal: RECEIVED, PENDING (com motivo) ou a reabertura de
// uma nota recebida por engano.
#[utoipa::path(
    patch,
    path = "/api/invoices/{id}/status",
    tag = "Invoices",
    request_body = SetStatusPayload,
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Status atualizado", body = Invoice),
        (status = 403, description = "Sem permissão para a transição"),
        (status = 409, description = "Transição não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStatusPayload>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = app_state.invoice_service.set_status(&user, id, payload).await?;
    Ok(Json(invoice))
}

// O autor resolve uma pendência e a nota volta para a fila de análise.
#[utoipa::path(
    post,
    path = "/api/invoices/{id}/repost",
    tag = "Invoices",
    request_body = RepostPayload,
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota repostada para análise", body = Invoice),
        (status = 409, description = "A nota não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn repost_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RepostPayload>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = app_state.invoice_service.repost(&user, id, payload).await?;
    Ok(Json(invoice))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}/arquivo",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Comprovante anexado à nota"),
        (status = 404, description = "Nota ou anexo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_attachment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (invoice, bytes) = app_state.invoice_service.attachment_for(&user, id).await?;

    let file_name = invoice_service::download_file_name(&invoice);
    let content_type = if file_name.ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    };

    // Configura os headers para o navegador baixar o arquivo
    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];

    Ok((headers, bytes).into_response())
}

// Extração do relatório geral: o mesmo recorte da listagem, em CSV.
#[utoipa::path(
    get,
    path = "/api/invoices/export",
    tag = "Invoices",
    params(InvoiceFilter),
    responses((status = 200, description = "CSV das notas visíveis e filtradas")),
    security(("api_jwt" = []))
)]
pub async fn export_csv(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<InvoiceFilter>,
) -> Result<Response, AppError> {
    let invoices = app_state.invoice_service.list(&user, &filter).await;
    let csv = report_service::to_csv(&invoices);

    let file_name = format!("PortalDelp_Relatorio_Geral_{}.csv", Utc::now().format("%Y-%m-%d"));
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];

    Ok((headers, csv).into_response())
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeInvoicePayload {
    // Imagem do comprovante em base64, sem o prefixo data-url.
    pub base64_image: String,
}

// Pré-preenchimento do formulário a partir da foto da nota. Melhor esforço:
// em falha da IA os campos voltam vazios e o usuário digita manualmente.
#[utoipa::path(
    post,
    path = "/api/invoices/analyze",
    tag = "Invoices",
    request_body = AnalyzeInvoicePayload,
    responses((status = 200, description = "Palpites extraídos da imagem", body = ExtractedInvoiceFields)),
    security(("api_jwt" = []))
)]
pub async fn analyze_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Json(payload): Json<AnalyzeInvoicePayload>,
) -> Json<ExtractedInvoiceFields> {
    Json(app_state.ai_service.analyze_invoice_image(&payload.base64_image).await)
}
