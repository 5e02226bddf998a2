// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::AdminUser,
    models::{dashboard::DashboardSummary, invoice::InvoiceFilter},
    services::report_service,
};

// Os números do painel administrativo mais a análise narrada pela IA.
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses((status = 200, description = "Resumo do portal", body = DashboardSummary)),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<DashboardSummary>, AppError> {
    let invoices = app_state
        .invoice_service
        .list(&admin, &InvoiceFilter::default())
        .await;

    let suppliers = report_service::aggregate_by_supplier(&invoices);
    let ai_summary = app_state.ai_service.financial_summary(&invoices).await;

    Ok(Json(DashboardSummary {
        total_value: report_service::total_value(&invoices),
        invoice_count: invoices.len(),
        supplier_count: suppliers.len(),
        suppliers,
        ai_summary,
    }))
}
