// src/services/review.rs
//
// O fluxo de revisão das notas em uma única tabela de transições. Qualquer
// ação de status ou exclusão passa por aqui antes de tocar o RecordStore:
// pedido rejeitado não muda estado nenhum.

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        invoice::{Invoice, InvoiceStatus},
    },
};

/// Papel do solicitante em relação a uma nota específica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Admin,
    Author,
    Other,
}

pub fn actor_for(user: &User, invoice: &Invoice) -> Actor {
    if user.is_admin() {
        Actor::Admin
    } else if invoice.uploaded_by == user.id {
        Actor::Author
    } else {
        Actor::Other
    }
}

/// A tabela de transições legais:
/// - fiscal marca recebimento a partir de análise ou pendência;
/// - fiscal devolve como pendência apenas notas em análise (RECEBIDA é
///   terminal para o fluxo normal);
/// - autor (ou fiscal) reposta uma pendência de volta para análise;
/// - fiscal pode reabrir uma nota recebida por engano (RECEBIDA -> EM
///   ANÁLISE), a válvula de escape de correção.
pub fn transition_allowed(actor: Actor, from: InvoiceStatus, to: InvoiceStatus) -> bool {
    use InvoiceStatus::*;
    matches!(
        (actor, from, to),
        (Actor::Admin, InReview, Received)
            | (Actor::Admin, Pending, Received)
            | (Actor::Admin, InReview, Pending)
            | (Actor::Admin | Actor::Author, Pending, InReview)
            | (Actor::Admin, Received, InReview)
    )
}

/// Valida uma transição antes de qualquer mutação. Distingue o motivo da
/// recusa: transição que existe na tabela mas não para esse papel vira erro
/// de permissão; transição que não existe para ninguém é conflito de estado.
pub fn authorize_transition(
    actor: Actor,
    from: InvoiceStatus,
    to: InvoiceStatus,
) -> Result<(), AppError> {
    if transition_allowed(actor, from, to) {
        return Ok(());
    }
    let allowed_for_someone = [Actor::Admin, Actor::Author]
        .into_iter()
        .any(|a| transition_allowed(a, from, to));
    if allowed_for_someone {
        // O repost de pendência é a única transição aberta ao autor; o resto
        // da tabela pertence ao fiscal.
        match (from, to) {
            (InvoiceStatus::Pending, InvoiceStatus::InReview) => Err(AppError::NotRecordAuthor),
            _ => Err(AppError::AdminOnly),
        }
    } else {
        Err(AppError::InvalidStatusTransition(from, to))
    }
}

/// Guarda de exclusão: fiscal sempre pode; o autor, enquanto a nota não foi
/// recebida. Nota recebida é travada para todo mundo que não é fiscal, e a
/// recusa é um erro explícito, nunca um no-op silencioso.
pub fn authorize_delete(actor: Actor, status: InvoiceStatus) -> Result<(), AppError> {
    match actor {
        Actor::Admin => Ok(()),
        Actor::Author if status != InvoiceStatus::Received => Ok(()),
        Actor::Author => Err(AppError::RecordLocked),
        Actor::Other => Err(AppError::NotRecordAuthor),
    }
}

/// Guarda de edição dos campos da nota: mesmas regras da exclusão.
pub fn authorize_edit(actor: Actor, status: InvoiceStatus) -> Result<(), AppError> {
    authorize_delete(actor, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvoiceStatus::*;

    #[test]
    fn fiscal_recebe_nota_em_analise_ou_pendente() {
        assert!(transition_allowed(Actor::Admin, InReview, Received));
        assert!(transition_allowed(Actor::Admin, Pending, Received));
    }

    #[test]
    fn so_o_fiscal_recebe_ou_marca_pendencia() {
        for actor in [Actor::Author, Actor::Other] {
            assert!(matches!(
                authorize_transition(actor, InReview, Received).unwrap_err(),
                AppError::AdminOnly
            ));
            assert!(matches!(
                authorize_transition(actor, InReview, Pending).unwrap_err(),
                AppError::AdminOnly
            ));
        }
    }

    #[test]
    fn autor_ou_fiscal_repostam_pendencia() {
        assert!(transition_allowed(Actor::Author, Pending, InReview));
        assert!(transition_allowed(Actor::Admin, Pending, InReview));
        assert!(matches!(
            authorize_transition(Actor::Other, Pending, InReview).unwrap_err(),
            AppError::NotRecordAuthor
        ));
    }

    // Cenário do relatório geral: o fiscal recebe a nota da Acme e depois
    // tenta marcá-la como pendente. RECEBIDA é terminal: a tentativa é
    // recusada mesmo para o fiscal.
    #[test]
    fn nota_recebida_nao_vira_pendencia_nem_pelo_fiscal() {
        assert!(matches!(
            authorize_transition(Actor::Admin, Received, Pending).unwrap_err(),
            AppError::InvalidStatusTransition(Received, Pending)
        ));
    }

    #[test]
    fn reabertura_de_recebida_e_exclusiva_do_fiscal() {
        assert!(transition_allowed(Actor::Admin, Received, InReview));
        assert!(matches!(
            authorize_transition(Actor::Author, Received, InReview).unwrap_err(),
            AppError::AdminOnly
        ));
    }

    #[test]
    fn transicao_para_o_proprio_estado_e_recusada() {
        for status in [InReview, Received, Pending] {
            assert!(!transition_allowed(Actor::Admin, status, status));
        }
        assert!(matches!(
            authorize_transition(Actor::Admin, Pending, Pending).unwrap_err(),
            AppError::InvalidStatusTransition(Pending, Pending)
        ));
    }

    #[test]
    fn analise_nao_regride_sozinha() {
        // Não existe caminho de IN_REVIEW para IN_REVIEW nem transição que
        // não esteja na tabela.
        assert!(!transition_allowed(Actor::Admin, InReview, InReview));
        assert!(!transition_allowed(Actor::Author, InReview, Received));
        assert!(!transition_allowed(Actor::Author, InReview, Pending));
        assert!(!transition_allowed(Actor::Other, Received, InReview));
    }

    #[test]
    fn autor_exclui_enquanto_nao_recebida() {
        assert!(authorize_delete(Actor::Author, InReview).is_ok());
        assert!(authorize_delete(Actor::Author, Pending).is_ok());
        assert!(matches!(
            authorize_delete(Actor::Author, Received).unwrap_err(),
            AppError::RecordLocked
        ));
    }

    #[test]
    fn fiscal_exclui_sempre_terceiros_nunca() {
        for status in [InReview, Received, Pending] {
            assert!(authorize_delete(Actor::Admin, status).is_ok());
            assert!(matches!(
                authorize_delete(Actor::Other, status).unwrap_err(),
                AppError::NotRecordAuthor
            ));
        }
    }
}
