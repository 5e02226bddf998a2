// src/store/record_store.rs

use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{User, MASTER_ADMIN_ID},
        invoice::Invoice,
        supplier::Supplier,
        system::PortalSnapshot,
    },
    store::persistence::SnapshotStorage,
};

// O dono exclusivo do estado do portal: notas, usuários e fornecedores.
// Toda mutação é gravada de volta no adaptador de persistência antes de
// retornar (write-through), como o portal original espelhava cada alteração
// no armazenamento do navegador.
pub struct RecordStore {
    state: RwLock<PortalSnapshot>,
    storage: Arc<dyn SnapshotStorage>,
}

impl RecordStore {
    pub async fn open(storage: Arc<dyn SnapshotStorage>) -> Result<Self, AppError> {
        let snapshot = storage.load().await?.unwrap_or_default();
        Ok(Self {
            state: RwLock::new(snapshot),
            storage,
        })
    }

    // --- Snapshot (backup/restore) ---

    pub async fn snapshot(&self) -> PortalSnapshot {
        self.state.read().await.clone()
    }

    // Substitui TODO o estado do portal. Sem merge: é o contrato do restore.
    pub async fn replace_all(&self, snapshot: PortalSnapshot) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        *state = snapshot;
        self.storage.save(&state).await
    }

    // --- Notas ---

    pub async fn list_invoices(&self) -> Vec<Invoice> {
        self.state.read().await.invoices.clone()
    }

    pub async fn get_invoice(&self, id: Uuid) -> Option<Invoice> {
        self.state.read().await.invoices.iter().find(|i| i.id == id).cloned()
    }

    pub async fn insert_invoice(&self, invoice: Invoice) -> Result<Invoice, AppError> {
        let mut state = self.state.write().await;
        state.invoices.push(invoice.clone());
        self.storage.save(&state).await?;
        Ok(invoice)
    }

    // Substitui a nota de mesmo id pela versão recebida.
    pub async fn update_invoice(&self, invoice: Invoice) -> Result<Invoice, AppError> {
        let mut state = self.state.write().await;
        let slot = state
            .invoices
            .iter_mut()
            .find(|i| i.id == invoice.id)
            .ok_or(AppError::InvoiceNotFound)?;
        *slot = invoice.clone();
        self.storage.save(&state).await?;
        Ok(invoice)
    }

    // Remove e devolve a nota, para que o chamador limpe o anexo.
    pub async fn delete_invoice(&self, id: Uuid) -> Result<Invoice, AppError> {
        let mut state = self.state.write().await;
        let pos = state
            .invoices
            .iter()
            .position(|i| i.id == id)
            .ok_or(AppError::InvoiceNotFound)?;
        let removed = state.invoices.remove(pos);
        self.storage.save(&state).await?;
        Ok(removed)
    }

    // --- Usuários ---

    pub async fn list_users(&self) -> Vec<User> {
        self.state.read().await.users.clone()
    }

    pub async fn get_user(&self, id: &str) -> Option<User> {
        self.state.read().await.users.iter().find(|u| u.id == id).cloned()
    }

    pub async fn insert_user(&self, user: User) -> Result<User, AppError> {
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::EmailAlreadyExists);
        }
        state.users.push(user.clone());
        self.storage.save(&state).await?;
        Ok(user)
    }

    pub async fn update_user(&self, user: User) -> Result<User, AppError> {
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::EmailAlreadyExists);
        }
        let slot = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AppError::UserNotFound)?;
        *slot = user.clone();
        self.storage.save(&state).await?;
        Ok(user)
    }

    // Invariante do portal: o master nunca sai da base.
    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        if id == MASTER_ADMIN_ID {
            return Err(AppError::MasterUserProtected);
        }
        let mut state = self.state.write().await;
        let pos = state
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(AppError::UserNotFound)?;
        state.users.remove(pos);
        self.storage.save(&state).await?;
        Ok(())
    }

    // --- Fornecedores ---

    pub async fn list_suppliers(&self) -> Vec<Supplier> {
        self.state.read().await.suppliers.clone()
    }

    pub async fn get_supplier(&self, id: Uuid) -> Option<Supplier> {
        self.state.read().await.suppliers.iter().find(|s| s.id == id).cloned()
    }

    pub async fn insert_supplier(&self, supplier: Supplier) -> Result<Supplier, AppError> {
        let mut state = self.state.write().await;
        state.suppliers.push(supplier.clone());
        self.storage.save(&state).await?;
        Ok(supplier)
    }

    pub async fn update_supplier(&self, supplier: Supplier) -> Result<Supplier, AppError> {
        let mut state = self.state.write().await;
        let slot = state
            .suppliers
            .iter_mut()
            .find(|s| s.id == supplier.id)
            .ok_or(AppError::SupplierNotFound)?;
        *slot = supplier.clone();
        self.storage.save(&state).await?;
        Ok(supplier)
    }

    pub async fn delete_supplier(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let pos = state
            .suppliers
            .iter()
            .position(|s| s.id == id)
            .ok_or(AppError::SupplierNotFound)?;
        state.suppliers.remove(pos);
        self.storage.save(&state).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use crate::store::persistence::MemoryStorage;

    async fn store_vazio() -> RecordStore {
        RecordStore::open(Arc::new(MemoryStorage::new())).await.unwrap()
    }

    fn usuario(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            name: "Teste".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::User,
            sector: Some("FINANCEIRO".to_string()),
        }
    }

    #[tokio::test]
    async fn master_nao_pode_ser_excluido() {
        let store = store_vazio().await;
        store.insert_user(usuario(MASTER_ADMIN_ID, "delp")).await.unwrap();

        let err = store.delete_user(MASTER_ADMIN_ID).await.unwrap_err();
        assert!(matches!(err, AppError::MasterUserProtected));
        assert_eq!(store.list_users().await.len(), 1);
    }

    #[tokio::test]
    async fn email_duplicado_e_rejeitado_sem_diferenciar_caixa() {
        let store = store_vazio().await;
        store.insert_user(usuario("u1", "maria@delp.com.br")).await.unwrap();

        let err = store.insert_user(usuario("u2", "MARIA@delp.com.br")).await.unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn atualizar_usuario_nao_conflita_com_o_proprio_email() {
        let store = store_vazio().await;
        store.insert_user(usuario("u1", "maria@delp.com.br")).await.unwrap();

        let mut editado = usuario("u1", "maria@delp.com.br");
        editado.name = "Maria Silva".to_string();
        let salvo = store.update_user(editado).await.unwrap();
        assert_eq!(salvo.name, "Maria Silva");
    }

    #[tokio::test]
    async fn restore_substitui_o_estado_por_inteiro() {
        let store = store_vazio().await;
        store.insert_user(usuario("u1", "a@delp.com.br")).await.unwrap();
        store.insert_user(usuario("u2", "b@delp.com.br")).await.unwrap();

        let mut novo = PortalSnapshot::default();
        novo.users.push(usuario("u9", "c@delp.com.br"));
        store.replace_all(novo).await.unwrap();

        let users = store.list_users().await;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "u9");
    }
}
