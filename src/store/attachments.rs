// src/store/attachments.rs

use std::path::PathBuf;

use uuid::Uuid;

use crate::common::error::AppError;

// Os comprovantes enviados ficam fora do snapshot JSON: um arquivo por
// anexo, nomeado pelo id opaco que a nota carrega.
#[derive(Clone)]
pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(id.to_string())
    }

    pub async fn save(&self, bytes: &[u8]) -> Result<Uuid, AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let id = Uuid::new_v4();
        tokio::fs::write(self.path_for(id), bytes).await?;
        Ok(id)
    }

    pub async fn read(&self, id: Uuid) -> Result<Vec<u8>, AppError> {
        match tokio::fs::read(self.path_for(id)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::AttachmentNotFound),
            Err(e) => Err(e.into()),
        }
    }

    // Melhor esforço: uma nota excluída sem anexo em disco não é um erro.
    pub async fn remove(&self, id: Uuid) {
        if let Err(e) = tokio::fs::remove_file(self.path_for(id)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Falha ao remover anexo {}: {}", id, e);
            }
        }
    }
}
