// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// 1. Os cards do topo do painel administrativo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_value: Decimal,   // Valor total acumulado
    pub invoice_count: usize,   // Total de notas postadas
    pub supplier_count: usize,  // Fornecedores distintos
    pub suppliers: Vec<SupplierSlice>,
    // Análise financeira narrada pela IA (ou texto de fallback).
    pub ai_summary: String,
}

// 2. Investimento por fornecedor (gráfico de barras)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSlice {
    pub name: String,
    pub count: usize,
    pub total_value: Decimal,
}
