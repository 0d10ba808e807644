// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Estrutura de dados ("claims") dentro do JWT emitido pelo serviço de
// identidade. Este backend não emite tokens, só os valida.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,               // Subject (ID do usuário)
    pub exp: usize,              // Expiration time
    pub iat: usize,              // Issued At
    pub branch_id: Option<Uuid>, // None = escopo da organização inteira
}

/// Escopo do chamador, derivado das claims. Gerentes de unidade preparam a
/// escala; publicar e travar são ações do escopo da organização.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerScope {
    Organization,
    Branch(Uuid),
}

impl CallerScope {
    pub fn is_org_wide(&self) -> bool {
        matches!(self, CallerScope::Organization)
    }
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub scope: CallerScope,
}
