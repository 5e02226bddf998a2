// src/services/report_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::{
        dashboard::SupplierSlice,
        invoice::Invoice,
        system::PortalSnapshot,
    },
    store::RecordStore,
};

// Relatórios, backup e os agregados do painel administrativo.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<RecordStore>,
}

impl ReportService {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    pub async fn backup(&self) -> PortalSnapshot {
        self.store.snapshot().await
    }

    pub async fn restore(&self, snapshot: PortalSnapshot) -> Result<(), AppError> {
        tracing::info!(
            "Restaurando backup: {} notas, {} usuários, {} fornecedores",
            snapshot.invoices.len(),
            snapshot.users.len(),
            snapshot.suppliers.len()
        );
        self.store.replace_all(snapshot).await
    }
}

// Um campo de texto não pode quebrar o layout de 8 colunas do relatório.
fn csv_field(value: &str) -> String {
    value.replace([';', '\n', '\r'], " ")
}

fn csv_currency(value: Decimal) -> String {
    value.round_dp(2).to_string().replace('.', ",")
}

/// Relatório geral em CSV: UTF-8 com BOM, separador `;`, moeda com vírgula
/// decimal — o formato que o Excel corporativo abre sem perguntas.
pub fn to_csv(invoices: &[Invoice]) -> String {
    let mut out = String::from("\u{feff}");
    out.push_str(
        "Fornecedor;Numero Nota;Valor (R$);Pedido/OS;Data Emissao;Observacoes;Postado Por;Data Cadastro (Portal)\n",
    );
    for inv in invoices {
        let row = [
            csv_field(&inv.supplier_name),
            csv_field(&inv.invoice_number),
            csv_currency(inv.value),
            csv_field(&inv.order_number),
            inv.emission_date.format("%Y-%m-%d").to_string(),
            csv_field(inv.observations.as_deref().unwrap_or_default()),
            csv_field(&inv.user_name),
            inv.created_at.format("%d/%m/%Y %H:%M").to_string(),
        ];
        out.push_str(&row.join(";"));
        out.push('\n');
    }
    out
}

/// Investimento por fornecedor, do maior total para o menor.
pub fn aggregate_by_supplier(invoices: &[Invoice]) -> Vec<SupplierSlice> {
    let mut by_name: HashMap<&str, (usize, Decimal)> = HashMap::new();
    for inv in invoices {
        let entry = by_name.entry(inv.supplier_name.as_str()).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += inv.value;
    }

    let mut slices: Vec<SupplierSlice> = by_name
        .into_iter()
        .map(|(name, (count, total_value))| SupplierSlice {
            name: name.to_string(),
            count,
            total_value,
        })
        .collect();
    slices.sort_by(|a, b| b.total_value.cmp(&a.total_value));
    slices
}

pub fn total_value(invoices: &[Invoice]) -> Decimal {
    invoices.iter().map(|inv| inv.value).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::{DocType, InvoiceStatus};
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn nota(supplier: &str, cents: i64) -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            supplier_id: None,
            supplier_name: supplier.to_string(),
            supplier_cnpj: None,
            invoice_number: "000.123".to_string(),
            emission_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            order_number: "OS-1".to_string(),
            value: Decimal::new(cents, 2),
            doc_type: DocType::Osv,
            status: InvoiceStatus::InReview,
            uploaded_by: "u1".to_string(),
            user_name: "Maria".to_string(),
            user_sector: "FINANCEIRO".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 16, 14, 30, 0).unwrap(),
            observations: None,
            admin_observations: None,
            user_response: None,
            file_name: "nota.pdf".to_string(),
            attachment_id: None,
        }
    }

    #[test]
    fn csv_comeca_com_bom_e_cabecalho() {
        let csv = to_csv(&[]);
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv.contains("Fornecedor;Numero Nota;Valor (R$)"));
    }

    #[test]
    fn csv_usa_virgula_decimal_e_ponto_e_virgula() {
        let csv = to_csv(&[nota("Acme LTDA", 123456)]);
        let linha = csv.lines().nth(1).unwrap();
        assert_eq!(
            linha,
            "Acme LTDA;000.123;1234,56;OS-1;2024-03-15;;Maria;16/03/2024 14:30"
        );
    }

    #[test]
    fn campo_com_ponto_e_virgula_nao_quebra_colunas() {
        let mut n = nota("Acme; Filial", 100);
        n.observations = Some("linha um\nlinha dois".to_string());
        let csv = to_csv(&[n]);
        let linha = csv.lines().nth(1).unwrap();
        assert_eq!(linha.matches(';').count(), 7);
    }

    #[test]
    fn agregado_ordena_do_maior_para_o_menor() {
        let notas = vec![nota("Acme", 10000), nota("Beta", 20000), nota("Acme", 5000)];
        let slices = aggregate_by_supplier(&notas);

        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].name, "Beta");
        assert_eq!(slices[0].count, 1);
        assert_eq!(slices[1].name, "Acme");
        assert_eq!(slices[1].count, 2);
        assert_eq!(slices[1].total_value, Decimal::new(15000, 2));

        assert_eq!(total_value(&notas), Decimal::new(35000, 2));
    }
}
