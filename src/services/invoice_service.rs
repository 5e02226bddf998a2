// src/services/invoice_service.rs

use std::sync::Arc;

use base64::prelude::*;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        invoice::{
            CreateInvoicePayload, Invoice, InvoiceFilter, InvoiceStatus, RepostPayload,
            SetStatusPayload, UpdateInvoicePayload,
        },
    },
    services::{review, visibility},
    store::{AttachmentStore, RecordStore},
};

// Orquestra o ciclo de vida das notas: postagem, listagem recortada por
// perfil, edição, exclusão e o fluxo de revisão. As regras em si moram em
// services::visibility e services::review.
#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<RecordStore>,
    attachments: AttachmentStore,
}

impl InvoiceService {
    pub fn new(store: Arc<RecordStore>, attachments: AttachmentStore) -> Self {
        Self { store, attachments }
    }

    pub async fn post(&self, author: &User, payload: CreateInvoicePayload) -> Result<Invoice, AppError> {
        let bytes = BASE64_STANDARD
            .decode(payload.file_base64.as_bytes())
            .map_err(|_| AppError::InvalidAttachment)?;
        let attachment_id = self.attachments.save(&bytes).await?;

        let invoice = Invoice {
            id: Uuid::new_v4(),
            supplier_id: payload.supplier_id,
            supplier_name: payload.supplier_name,
            supplier_cnpj: payload.supplier_cnpj,
            invoice_number: payload.invoice_number,
            emission_date: payload.emission_date,
            order_number: payload.order_number,
            value: payload.value,
            doc_type: payload.doc_type,
            // Garante que a nota nasce "Em Análise", não importa quem posta.
            status: InvoiceStatus::InReview,
            uploaded_by: author.id.clone(),
            user_name: author.name.clone(),
            // Fotografia do setor no momento da postagem.
            user_sector: author.sector.clone().unwrap_or_default(),
            created_at: Utc::now(),
            observations: payload.observations,
            admin_observations: None,
            user_response: None,
            file_name: payload.file_name,
            attachment_id: Some(attachment_id),
        };

        self.store.insert_invoice(invoice).await
    }

    pub async fn list(&self, requester: &User, filter: &InvoiceFilter) -> Vec<Invoice> {
        visibility::select_for(requester, self.store.list_invoices().await, filter)
    }

    pub async fn update(
        &self,
        requester: &User,
        id: Uuid,
        payload: UpdateInvoicePayload,
    ) -> Result<Invoice, AppError> {
        let mut invoice = self.store.get_invoice(id).await.ok_or(AppError::InvoiceNotFound)?;
        review::authorize_edit(review::actor_for(requester, &invoice), invoice.status)?;

        if let Some(v) = payload.supplier_id {
            invoice.supplier_id = Some(v);
        }
        if let Some(v) = payload.supplier_name {
            invoice.supplier_name = v;
        }
        if let Some(v) = payload.supplier_cnpj {
            invoice.supplier_cnpj = Some(v);
        }
        if let Some(v) = payload.invoice_number {
            invoice.invoice_number = v;
        }
        if let Some(v) = payload.emission_date {
            invoice.emission_date = v;
        }
        if let Some(v) = payload.order_number {
            invoice.order_number = v;
        }
        if let Some(v) = payload.value {
            invoice.value = v;
        }
        if let Some(v) = payload.doc_type {
            invoice.doc_type = v;
        }
        if let Some(v) = payload.observations {
            invoice.observations = Some(v);
        }

        self.store.update_invoice(invoice).await
    }

    pub async fn delete(&self, requester: &User, id: Uuid) -> Result<(), AppError> {
        let invoice = self.store.get_invoice(id).await.ok_or(AppError::InvoiceNotFound)?;
        review::authorize_delete(review::actor_for(requester, &invoice), invoice.status)?;

        let removed = self.store.delete_invoice(id).await?;
        if let Some(attachment_id) = removed.attachment_id {
            self.attachments.remove(attachment_id).await;
        }
        Ok(())
    }

    // Transições disparadas pelo fiscal na tela de revisão.
    pub async fn set_status(
        &self,
        requester: &User,
        id: Uuid,
        payload: SetStatusPayload,
    ) -> Result<Invoice, AppError> {
        let mut invoice = self.store.get_invoice(id).await.ok_or(AppError::InvoiceNotFound)?;
        let actor = review::actor_for(requester, &invoice);
        let from = invoice.status;
        review::authorize_transition(actor, from, payload.status)?;

        match payload.status {
            InvoiceStatus::Received => {
                invoice.status = InvoiceStatus::Received;
            }
            InvoiceStatus::Pending => {
                let reason = payload
                    .admin_observations
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or(AppError::MissingPendingReason)?;
                invoice.status = InvoiceStatus::Pending;
                invoice.admin_observations = Some(reason.to_string());
                // Pendência nova apaga a resposta de um ciclo anterior.
                invoice.user_response = None;
            }
            InvoiceStatus::InReview => {
                if from == InvoiceStatus::Received {
                    // Válvula de escape do fiscal; fica registrada no log.
                    tracing::warn!(
                        "Nota {} reaberta pelo fiscal {} (RECEIVED -> IN_REVIEW)",
                        invoice.id,
                        requester.id
                    );
                    invoice.status = InvoiceStatus::InReview;
                } else {
                    // PENDING -> IN_REVIEW pelo fiscal equivale a um repost
                    // sem resposta do autor.
                    apply_repost(&mut invoice, None);
                }
            }
        }

        self.store.update_invoice(invoice).await
    }

    // O autor resolve uma pendência: a nota volta para o topo da fila de
    // análise, com a resposta dele registrada.
    pub async fn repost(
        &self,
        requester: &User,
        id: Uuid,
        payload: RepostPayload,
    ) -> Result<Invoice, AppError> {
        let mut invoice = self.store.get_invoice(id).await.ok_or(AppError::InvoiceNotFound)?;

        if invoice.status != InvoiceStatus::Pending {
            return Err(AppError::InvalidStatusTransition(invoice.status, InvoiceStatus::InReview));
        }
        review::authorize_transition(
            review::actor_for(requester, &invoice),
            invoice.status,
            InvoiceStatus::InReview,
        )?;

        apply_repost(&mut invoice, payload.user_response);
        self.store.update_invoice(invoice).await
    }

    // Busca o anexo de uma nota visível ao solicitante. Nota fora do recorte
    // responde como inexistente.
    pub async fn attachment_for(
        &self,
        requester: &User,
        id: Uuid,
    ) -> Result<(Invoice, Vec<u8>), AppError> {
        let invoice = self.store.get_invoice(id).await.ok_or(AppError::InvoiceNotFound)?;
        if !visibility::visible_to(requester, &invoice) {
            return Err(AppError::InvoiceNotFound);
        }
        let attachment_id = invoice.attachment_id.ok_or(AppError::AttachmentNotFound)?;
        let bytes = self.attachments.read(attachment_id).await?;
        Ok((invoice, bytes))
    }
}

fn apply_repost(invoice: &mut Invoice, user_response: Option<String>) {
    invoice.status = InvoiceStatus::InReview;
    // A nota reentra na fila como se tivesse acabado de ser postada.
    invoice.created_at = Utc::now();
    invoice.admin_observations = None;
    if let Some(response) = user_response {
        invoice.user_response = Some(response);
    }
}

/// Nome de download do comprovante: autor + número da nota, preservando a
/// extensão enviada.
pub fn download_file_name(invoice: &Invoice) -> String {
    let extension = std::path::Path::new(&invoice.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("pdf");
    let base = format!("{}_{}", invoice.user_name, invoice.invoice_number);
    let sanitized: String = base
        .chars()
        .map(|c| if c == '/' || c == '\\' || c == '"' { '_' } else { c })
        .collect();
    format!("{}.{}", sanitized, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use crate::models::invoice::DocType;
    use crate::store::persistence::MemoryStorage;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn usuario(id: &str, role: UserRole, sector: Option<&str>) -> User {
        User {
            id: id.to_string(),
            name: format!("Usuário {}", id),
            email: format!("{}@delp.com.br", id),
            password_hash: "hash".to_string(),
            role,
            sector: sector.map(str::to_string),
        }
    }

    fn payload(supplier: &str, value: i64) -> CreateInvoicePayload {
        CreateInvoicePayload {
            supplier_id: None,
            supplier_name: supplier.to_string(),
            supplier_cnpj: None,
            invoice_number: "000.123".to_string(),
            emission_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            order_number: "OS-1".to_string(),
            value: Decimal::new(value, 0),
            doc_type: DocType::Osv,
            observations: None,
            file_name: "nota.pdf".to_string(),
            file_base64: BASE64_STANDARD.encode(b"%PDF-1.4"),
        }
    }

    // Devolve também o TempDir: o diretório de anexos precisa viver até o
    // fim do teste.
    async fn servico() -> (InvoiceService, tempfile::TempDir) {
        let store = Arc::new(RecordStore::open(Arc::new(MemoryStorage::new())).await.unwrap());
        let dir = tempfile::tempdir().unwrap();
        let attachments = AttachmentStore::new(dir.path().join("anexos"));
        (InvoiceService::new(store, attachments), dir)
    }

    #[tokio::test]
    async fn nota_nasce_em_analise_seja_quem_for_o_autor() {
        let (svc, _dir) = servico().await;
        for user in [
            usuario("u1", UserRole::User, Some("FINANCEIRO")),
            usuario("g1", UserRole::Manager, Some("RH")),
            usuario("admin-master", UserRole::Admin, None),
        ] {
            let nota = svc.post(&user, payload("Acme", 100)).await.unwrap();
            assert_eq!(nota.status, InvoiceStatus::InReview);
            assert_eq!(nota.uploaded_by, user.id);
        }
    }

    #[tokio::test]
    async fn postagem_fotografa_o_setor_do_autor() {
        let (svc, _dir) = servico().await;
        let autor = usuario("u1", UserRole::User, Some("FINANCEIRO"));
        let nota = svc.post(&autor, payload("Acme", 100)).await.unwrap();
        assert_eq!(nota.user_sector, "FINANCEIRO");
    }

    // Propriedade do repost: volta para análise, limpa a observação do
    // fiscal, registra a resposta e rejuvenesce o created_at.
    #[tokio::test]
    async fn repost_de_pendencia_reinicia_o_ciclo() {
        let (svc, _dir) = servico().await;
        let autor = usuario("u1", UserRole::User, Some("FINANCEIRO"));
        let admin = usuario("admin-master", UserRole::Admin, None);

        let nota = svc.post(&autor, payload("Acme", 100)).await.unwrap();
        let pendente = svc
            .set_status(
                &admin,
                nota.id,
                SetStatusPayload {
                    status: InvoiceStatus::Pending,
                    admin_observations: Some("Valor divergente do pedido".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(pendente.status, InvoiceStatus::Pending);
        let criada_em = pendente.created_at;

        let repostada = svc
            .repost(
                &autor,
                nota.id,
                RepostPayload { user_response: Some("Valor corrigido conforme OS".to_string()) },
            )
            .await
            .unwrap();

        assert_eq!(repostada.status, InvoiceStatus::InReview);
        assert!(repostada.admin_observations.is_none());
        assert_eq!(repostada.user_response.as_deref(), Some("Valor corrigido conforme OS"));
        assert!(repostada.created_at > criada_em);
    }

    #[tokio::test]
    async fn pendencia_exige_motivo() {
        let (svc, _dir) = servico().await;
        let autor = usuario("u1", UserRole::User, Some("FINANCEIRO"));
        let admin = usuario("admin-master", UserRole::Admin, None);

        let nota = svc.post(&autor, payload("Acme", 100)).await.unwrap();
        let err = svc
            .set_status(
                &admin,
                nota.id,
                SetStatusPayload { status: InvoiceStatus::Pending, admin_observations: Some("   ".to_string()) },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingPendingReason));

        // Recusa não muda estado nenhum.
        let atual = svc.store.get_invoice(nota.id).await.unwrap();
        assert_eq!(atual.status, InvoiceStatus::InReview);
    }

    #[tokio::test]
    async fn nova_pendencia_apaga_resposta_do_ciclo_anterior() {
        let (svc, _dir) = servico().await;
        let autor = usuario("u1", UserRole::User, Some("FINANCEIRO"));
        let admin = usuario("admin-master", UserRole::Admin, None);

        let nota = svc.post(&autor, payload("Acme", 100)).await.unwrap();
        svc.set_status(
            &admin,
            nota.id,
            SetStatusPayload {
                status: InvoiceStatus::Pending,
                admin_observations: Some("Falta o pedido".to_string()),
            },
        )
        .await
        .unwrap();
        svc.repost(&autor, nota.id, RepostPayload { user_response: Some("Anexado".to_string()) })
            .await
            .unwrap();

        let pendente_de_novo = svc
            .set_status(
                &admin,
                nota.id,
                SetStatusPayload {
                    status: InvoiceStatus::Pending,
                    admin_observations: Some("Pedido ainda divergente".to_string()),
                },
            )
            .await
            .unwrap();

        assert!(pendente_de_novo.user_response.is_none());
        assert_eq!(pendente_de_novo.admin_observations.as_deref(), Some("Pedido ainda divergente"));
    }

    // Cenário Acme/Beta do recebimento terminal.
    #[tokio::test]
    async fn recebida_nao_aceita_pendencia_depois() {
        let (svc, _dir) = servico().await;
        let autor = usuario("u1", UserRole::User, Some("FINANCEIRO"));
        let admin = usuario("admin-master", UserRole::Admin, None);

        let acme = svc.post(&autor, payload("Acme", 100)).await.unwrap();
        let _beta = svc.post(&autor, payload("Beta", 200)).await.unwrap();

        svc.set_status(
            &admin,
            acme.id,
            SetStatusPayload { status: InvoiceStatus::Received, admin_observations: None },
        )
        .await
        .unwrap();

        let err = svc
            .set_status(
                &admin,
                acme.id,
                SetStatusPayload {
                    status: InvoiceStatus::Pending,
                    admin_observations: Some("Tentativa tardia".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidStatusTransition(InvoiceStatus::Received, InvoiceStatus::Pending)
        ));
    }

    #[tokio::test]
    async fn autor_nao_exclui_nota_recebida_e_nada_muda() {
        let (svc, _dir) = servico().await;
        let autor = usuario("u1", UserRole::User, Some("FINANCEIRO"));
        let admin = usuario("admin-master", UserRole::Admin, None);

        let nota = svc.post(&autor, payload("Acme", 100)).await.unwrap();
        svc.set_status(
            &admin,
            nota.id,
            SetStatusPayload { status: InvoiceStatus::Received, admin_observations: None },
        )
        .await
        .unwrap();

        let err = svc.delete(&autor, nota.id).await.unwrap_err();
        assert!(matches!(err, AppError::RecordLocked));
        assert_eq!(svc.store.list_invoices().await.len(), 1);

        // O fiscal continua podendo excluir.
        svc.delete(&admin, nota.id).await.unwrap();
        assert!(svc.store.list_invoices().await.is_empty());
    }

    #[tokio::test]
    async fn terceiro_nao_altera_nem_exclui() {
        let (svc, _dir) = servico().await;
        let autor = usuario("u1", UserRole::User, Some("FINANCEIRO"));
        let intruso = usuario("u2", UserRole::User, Some("FINANCEIRO"));

        let nota = svc.post(&autor, payload("Acme", 100)).await.unwrap();

        let err = svc.delete(&intruso, nota.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotRecordAuthor));

        let err = svc
            .update(
                &intruso,
                nota.id,
                UpdateInvoicePayload {
                    supplier_id: None,
                    supplier_name: Some("Outra".to_string()),
                    supplier_cnpj: None,
                    invoice_number: None,
                    emission_date: None,
                    order_number: None,
                    value: None,
                    doc_type: None,
                    observations: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotRecordAuthor));
    }

    #[tokio::test]
    async fn fiscal_reabre_nota_recebida() {
        let (svc, _dir) = servico().await;
        let autor = usuario("u1", UserRole::User, Some("FINANCEIRO"));
        let admin = usuario("admin-master", UserRole::Admin, None);

        let nota = svc.post(&autor, payload("Acme", 100)).await.unwrap();
        svc.set_status(
            &admin,
            nota.id,
            SetStatusPayload { status: InvoiceStatus::Received, admin_observations: None },
        )
        .await
        .unwrap();

        let reaberta = svc
            .set_status(
                &admin,
                nota.id,
                SetStatusPayload { status: InvoiceStatus::InReview, admin_observations: None },
            )
            .await
            .unwrap();
        assert_eq!(reaberta.status, InvoiceStatus::InReview);

        // O autor não tem essa válvula de escape.
        svc.set_status(
            &admin,
            nota.id,
            SetStatusPayload { status: InvoiceStatus::Received, admin_observations: None },
        )
        .await
        .unwrap();
        let err = svc
            .set_status(
                &autor,
                nota.id,
                SetStatusPayload { status: InvoiceStatus::InReview, admin_observations: None },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AdminOnly));
    }

    #[test]
    fn nome_de_download_une_autor_e_numero() {
        let mut nota = Invoice {
            id: Uuid::new_v4(),
            supplier_id: None,
            supplier_name: "Acme".to_string(),
            supplier_cnpj: None,
            invoice_number: "000.123".to_string(),
            emission_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            order_number: "OS-1".to_string(),
            value: Decimal::ZERO,
            doc_type: DocType::Osv,
            status: InvoiceStatus::InReview,
            uploaded_by: "u1".to_string(),
            user_name: "Maria Souza".to_string(),
            user_sector: "FINANCEIRO".to_string(),
            created_at: Utc::now(),
            observations: None,
            admin_observations: None,
            user_response: None,
            file_name: "comprovante.png".to_string(),
            attachment_id: None,
        };
        assert_eq!(download_file_name(&nota), "Maria Souza_000.123.png");

        nota.file_name = "semextensao".to_string();
        assert_eq!(download_file_name(&nota), "Maria Souza_000.123.pdf");
    }
}
