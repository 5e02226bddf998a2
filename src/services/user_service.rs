// src/services/user_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{CreateUserPayload, UpdateUserPayload, User, UserRole},
    services::auth::hash_password,
    store::RecordStore,
};

// Gestão de usuários do portal (ações do fiscal/master).
#[derive(Clone)]
pub struct UserService {
    store: Arc<RecordStore>,
}

impl UserService {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    // Setor vazio vira ausência; Gestor e Colaborador precisam de um.
    fn normalized_sector(role: UserRole, sector: Option<String>) -> Result<Option<String>, AppError> {
        let sector = sector
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        match role {
            UserRole::Admin => Ok(sector),
            UserRole::Manager | UserRole::User => {
                if sector.is_none() {
                    return Err(AppError::SectorRequired);
                }
                Ok(sector)
            }
        }
    }

    pub async fn list(&self) -> Vec<User> {
        self.store.list_users().await
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<User, AppError> {
        let sector = Self::normalized_sector(payload.role, payload.sector)?;
        let password_hash = hash_password(&payload.password).await?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: payload.name,
            email: payload.email,
            password_hash,
            role: payload.role,
            sector,
        };
        self.store.insert_user(user).await
    }

    pub async fn update(&self, id: &str, payload: UpdateUserPayload) -> Result<User, AppError> {
        let mut user = self.store.get_user(id).await.ok_or(AppError::UserNotFound)?;

        user.name = payload.name;
        user.email = payload.email;
        user.role = payload.role;
        user.sector = Self::normalized_sector(payload.role, payload.sector)?;

        // Senha só muda quando uma nova é enviada.
        if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
            user.password_hash = hash_password(&password).await?;
        }

        self.store.update_user(user).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.delete_user(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::persistence::MemoryStorage;

    async fn servico() -> UserService {
        let store = Arc::new(RecordStore::open(Arc::new(MemoryStorage::new())).await.unwrap());
        UserService::new(store)
    }

    fn payload(role: UserRole, sector: Option<&str>) -> CreateUserPayload {
        CreateUserPayload {
            name: "João".to_string(),
            email: "joao@delp.com.br".to_string(),
            password: "senha123".to_string(),
            role,
            sector: sector.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn colaborador_sem_setor_e_rejeitado() {
        let svc = servico().await;
        let err = svc.create(payload(UserRole::User, None)).await.unwrap_err();
        assert!(matches!(err, AppError::SectorRequired));

        let err = svc.create(payload(UserRole::Manager, Some("  "))).await.unwrap_err();
        assert!(matches!(err, AppError::SectorRequired));
    }

    #[tokio::test]
    async fn admin_dispensa_setor() {
        let svc = servico().await;
        let user = svc.create(payload(UserRole::Admin, None)).await.unwrap();
        assert!(user.sector.is_none());
        assert!(!user.password_hash.is_empty());
        assert_ne!(user.password_hash, "senha123");
    }

    #[tokio::test]
    async fn editar_sem_senha_preserva_o_hash() {
        let svc = servico().await;
        let criado = svc.create(payload(UserRole::User, Some("FINANCEIRO"))).await.unwrap();

        let editado = svc
            .update(
                &criado.id,
                UpdateUserPayload {
                    name: "João Silva".to_string(),
                    email: "joao@delp.com.br".to_string(),
                    password: None,
                    role: UserRole::User,
                    sector: Some("RH".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(editado.name, "João Silva");
        assert_eq!(editado.sector.as_deref(), Some("RH"));
        assert_eq!(editado.password_hash, criado.password_hash);
    }
}
