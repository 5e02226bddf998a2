// src/services/ai_service.rs

use std::time::Duration;

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::models::invoice::Invoice;

const GEMINI_MODEL: &str = "gemini-2.0-flash";

// Palpites extraídos da imagem da nota. Nunca são autoritativos: o usuário
// revisa tudo antes de enviar.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedInvoiceFields {
    pub supplier_name: Option<String>,
    pub invoice_number: Option<String>,
    // A IA pode devolver a data em formato inesperado; fica como texto.
    pub emission_date: Option<String>,
    pub order_number: Option<String>,
    pub value: Option<Decimal>,
}

// Adaptador do Gemini: pré-preenche o formulário a partir da imagem e narra
// o resumo financeiro do painel. Falha externa nunca bloqueia o fluxo de
// postagem: degrada para campos vazios / texto de fallback, sem retry.
#[derive(Clone)]
pub struct AiService {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl AiService {
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();
        Self { client, api_url, api_key }
    }

    pub async fn analyze_invoice_image(&self, base64_image: &str) -> ExtractedInvoiceFields {
        match self.try_analyze(base64_image).await {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!("Extração de campos via IA indisponível: {:#}", e);
                ExtractedInvoiceFields::default()
            }
        }
    }

    async fn try_analyze(&self, base64_image: &str) -> anyhow::Result<ExtractedInvoiceFields> {
        let prompt = "Você está lendo a foto de uma nota fiscal brasileira. \
            Responda SOMENTE com um JSON contendo as chaves supplierName, \
            invoiceNumber, emissionDate (AAAA-MM-DD), orderNumber e value \
            (número). Use null para o que não conseguir ler.";

        let body = json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": "image/jpeg", "data": base64_image } },
                    { "text": prompt },
                ]
            }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let text = self.generate(body).await?;
        serde_json::from_str(&text).context("resposta da IA não é o JSON esperado")
    }

    pub async fn financial_summary(&self, invoices: &[Invoice]) -> String {
        if invoices.is_empty() {
            return "Nenhuma nota fiscal postada até o momento.".to_string();
        }
        match self.try_summary(invoices).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => "Sem dados suficientes para análise.".to_string(),
            Err(e) => {
                tracing::warn!("Resumo financeiro via IA indisponível: {:#}", e);
                "Sem dados suficientes para análise.".to_string()
            }
        }
    }

    async fn try_summary(&self, invoices: &[Invoice]) -> anyhow::Result<String> {
        let linhas: Vec<String> = invoices
            .iter()
            .map(|inv| {
                format!(
                    "{};{};{};{}",
                    inv.supplier_name, inv.value, inv.emission_date, inv.status
                )
            })
            .collect();

        let prompt = format!(
            "Você é o analista financeiro de um portal corporativo de notas \
             fiscais. Dado o extrato abaixo (fornecedor;valor;emissão;status, \
             um por linha), escreva um resumo curto em português destacando \
             volume total, principais fornecedores e pendências.\n\n{}",
            linhas.join("\n")
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        self.generate(body).await
    }

    // Uma chamada ao generateContent, devolvendo o texto do primeiro
    // candidato.
    async fn generate(&self, body: serde_json::Value) -> anyhow::Result<String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("GEMINI_API_KEY não configurada"))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_url, GEMINI_MODEL, key
        );

        let response: GenerateContentResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| anyhow!("resposta da IA sem candidatos"))
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Sem chave configurada o adaptador degrada em silêncio: campos vazios
    // e texto de fallback, nunca erro.
    #[tokio::test]
    async fn sem_chave_degrada_para_vazio() {
        let ai = AiService::new("http://127.0.0.1:0".to_string(), None);

        let fields = ai.analyze_invoice_image("aGVsbG8=").await;
        assert!(fields.supplier_name.is_none());
        assert!(fields.value.is_none());

        assert_eq!(ai.financial_summary(&[]).await, "Nenhuma nota fiscal postada até o momento.");
    }

    #[test]
    fn palpites_da_ia_aceitam_json_parcial() {
        let fields: ExtractedInvoiceFields =
            serde_json::from_str(r#"{ "supplierName": "Acme", "value": 1234.56 }"#).unwrap();
        assert_eq!(fields.supplier_name.as_deref(), Some("Acme"));
        assert!(fields.invoice_number.is_none());
        assert_eq!(fields.value, Some(Decimal::try_from(1234.56).unwrap()));
    }
}
