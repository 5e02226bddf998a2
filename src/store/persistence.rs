// src/store/persistence.rs

use std::path::PathBuf;

use async_trait::async_trait;

use crate::{common::error::AppError, models::system::PortalSnapshot};

// A porta de persistência do portal. O RecordStore só conhece este trait,
// então toda a lógica de negócio roda em testes sem tocar o disco.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    // `None` significa "nenhum estado anterior": o portal sobe vazio.
    async fn load(&self) -> Result<Option<PortalSnapshot>, AppError>;
    async fn save(&self, snapshot: &PortalSnapshot) -> Result<(), AppError>;
}

// Implementação padrão: um único documento JSON em disco.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotStorage for JsonFileStorage {
    // Estado persistido corrompido nunca derruba o portal: registra o
    // problema e sobe com coleções vazias, deixando o restore de backup
    // como caminho de recuperação.
    async fn load(&self) -> Result<Option<PortalSnapshot>, AppError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                tracing::warn!("Falha ao ler o estado persistido ({}): {}", self.path.display(), e);
                return Ok(None);
            }
        };

        match serde_json::from_slice::<PortalSnapshot>(&bytes) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!(
                    "Estado persistido inválido em {} ({}). Subindo com coleções vazias.",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, snapshot: &PortalSnapshot) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| anyhow::anyhow!("Falha ao serializar o snapshot: {}", e))?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

// Armazenamento volátil para os testes dos serviços.
#[cfg(test)]
pub struct MemoryStorage {
    inner: std::sync::Mutex<Option<PortalSnapshot>>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self { inner: std::sync::Mutex::new(None) }
    }
}

#[cfg(test)]
#[async_trait]
impl SnapshotStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<PortalSnapshot>, AppError> {
        Ok(self.inner.lock().unwrap().clone())
    }

    async fn save(&self, snapshot: &PortalSnapshot) -> Result<(), AppError> {
        *self.inner.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }
}
