// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;
use crate::services;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_jwt",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Invoices ---
        handlers::invoices::create_invoice,
        handlers::invoices::list_invoices,
        handlers::invoices::update_invoice,
        handlers::invoices::delete_invoice,
        handlers::invoices::set_status,
        handlers::invoices::repost_invoice,
        handlers::invoices::download_attachment,
        handlers::invoices::export_csv,
        handlers::invoices::analyze_invoice,

        // --- Suppliers ---
        handlers::suppliers::list_suppliers,
        handlers::suppliers::create_supplier,
        handlers::suppliers::update_supplier,
        handlers::suppliers::delete_supplier,

        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- System ---
        handlers::system::backup,
        handlers::system::restore,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::UserPublic,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,

            // --- Invoices ---
            models::invoice::InvoiceStatus,
            models::invoice::DocType,
            models::invoice::Invoice,
            models::invoice::CreateInvoicePayload,
            models::invoice::UpdateInvoicePayload,
            models::invoice::SetStatusPayload,
            models::invoice::RepostPayload,

            // --- Suppliers ---
            models::supplier::Supplier,
            models::supplier::CreateSupplierPayload,
            models::supplier::UpdateSupplierPayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::SupplierSlice,

            // --- System ---
            models::system::PortalSnapshot,

            // --- Payloads ---
            handlers::invoices::AnalyzeInvoicePayload,
            services::ai_service::ExtractedInvoiceFields,
        )
    ),
    tags(
        (name = "Auth", description = "Login do portal"),
        (name = "Users", description = "Gestão de usuários"),
        (name = "Invoices", description = "Postagem e revisão de notas"),
        (name = "Suppliers", description = "Cadastro de fornecedores"),
        (name = "Dashboard", description = "Painel administrativo"),
        (name = "System", description = "Backup e restauração"),
    )
)]
pub struct ApiDoc;
