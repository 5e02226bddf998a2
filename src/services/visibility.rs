// src/services/visibility.rs
//
// Quem enxerga o quê. Toda a regra de recorte por perfil vive aqui: os
// handlers nunca reimplementam o predicado.

use crate::models::{
    auth::{User, UserRole},
    invoice::{Invoice, InvoiceFilter},
};

/// Regra de visibilidade por perfil, avaliada antes de qualquer filtro de
/// busca:
/// 1. ADMIN vê tudo;
/// 2. MANAGER vê as notas cujo setor fotografado na postagem é igual ao seu
///    (comparação exata; gestor sem setor não vê nada);
/// 3. USER vê apenas o que ele mesmo postou.
pub fn visible_to(user: &User, invoice: &Invoice) -> bool {
    match user.role {
        UserRole::Admin => true,
        UserRole::Manager => match user.sector.as_deref() {
            Some(sector) if !sector.is_empty() => invoice.user_sector == sector,
            _ => false,
        },
        UserRole::User => invoice.uploaded_by == user.id,
    }
}

fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(n) if !n.is_empty() => haystack.to_lowercase().contains(&n.to_lowercase()),
        _ => true,
    }
}

fn contains(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(n) if !n.is_empty() => haystack.contains(n),
        _ => true,
    }
}

/// Filtros de busca conjuntivos (E lógico). Campo vazio aceita tudo; os
/// intervalos de data são inclusivos, e o de postagem compara só a data
/// do `created_at`.
pub fn matches_filter(invoice: &Invoice, filter: &InvoiceFilter) -> bool {
    contains_ci(&invoice.supplier_name, filter.supplier_name.as_deref())
        && contains(&invoice.invoice_number, filter.invoice_number.as_deref())
        && contains_ci(&invoice.user_name, filter.user_name.as_deref())
        && contains(&invoice.user_sector, filter.sector.as_deref())
        && filter.emission_from.is_none_or(|d| invoice.emission_date >= d)
        && filter.emission_to.is_none_or(|d| invoice.emission_date <= d)
        && filter.posted_from.is_none_or(|d| invoice.created_at.date_naive() >= d)
        && filter.posted_to.is_none_or(|d| invoice.created_at.date_naive() <= d)
}

/// O recorte completo de exibição: visibilidade por perfil, filtros de
/// busca e ordenação por postagem (mais recentes primeiro).
pub fn select_for(user: &User, invoices: Vec<Invoice>, filter: &InvoiceFilter) -> Vec<Invoice> {
    let mut visible: Vec<Invoice> = invoices
        .into_iter()
        .filter(|inv| visible_to(user, inv) && matches_filter(inv, filter))
        .collect();
    visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    visible
}
