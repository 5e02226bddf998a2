// src/models/system.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{auth::User, invoice::Invoice, supplier::Supplier};

// O documento único de persistência e de backup do portal: todo o estado
// em um só JSON. O restore substitui o conteúdo por inteiro (sem merge).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortalSnapshot {
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
}
