// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use crate::{
    models::auth::{User, UserRole, MASTER_ADMIN_ID},
    services::{auth::hash_password, AiService, AuthService, InvoiceService, ReportService, UserService},
    store::{AttachmentStore, JsonFileStorage, RecordStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub invoice_service: InvoiceService,
    pub report_service: ReportService,
    pub ai_service: AiService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let data_dir = PathBuf::from(
            env::var("PORTAL_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
        );
        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        let gemini_api_url = env::var("GEMINI_API_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());

        // Carrega o snapshot persistido (ou sobe vazio, inclusive quando o
        // arquivo está corrompido — o restore de backup é o caminho de volta).
        let storage = Arc::new(JsonFileStorage::new(data_dir.join("portal.json")));
        let store = Arc::new(RecordStore::open(storage).await?);
        tracing::info!("✅ Estado do portal carregado de {}", data_dir.display());

        seed_default_users(&store).await?;

        let attachments = AttachmentStore::new(data_dir.join("anexos"));

        // --- Monta o gráfico de dependências ---
        let auth_service = AuthService::new(store.clone(), jwt_secret);
        let user_service = UserService::new(store.clone());
        let invoice_service = InvoiceService::new(store.clone(), attachments);
        let report_service = ReportService::new(store.clone());
        let ai_service = AiService::new(gemini_api_url, gemini_api_key);

        Ok(Self {
            store,
            auth_service,
            user_service,
            invoice_service,
            report_service,
            ai_service,
        })
    }
}

// Primeiro uso do portal: semeia o administrador master e um colaborador
// padrão quando não existe nenhum usuário salvo.
async fn seed_default_users(store: &RecordStore) -> anyhow::Result<()> {
    if !store.list_users().await.is_empty() {
        return Ok(());
    }

    store
        .insert_user(User {
            id: MASTER_ADMIN_ID.to_string(),
            name: "Administrador Master".to_string(),
            email: "delp".to_string(),
            password_hash: hash_password("delp1234").await?,
            role: UserRole::Admin,
            sector: None,
        })
        .await?;

    store
        .insert_user(User {
            id: "user-1".to_string(),
            name: "Colaborador Delp".to_string(),
            email: "usuario@delp.com.br".to_string(),
            password_hash: hash_password("123").await?,
            role: UserRole::User,
            sector: Some("GERAL".to_string()),
        })
        .await?;

    tracing::info!("🌱 Usuários padrão semeados (master + colaborador)");
    Ok(())
}
