// src/models/directory.rs
//
// Modelos de leitura do diretório de pessoal. Essas tabelas pertencem aos
// módulos de cadastro (colaboradores externos a este motor); aqui só lemos.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    #[schema(example = "Unidade Centro")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub branch_id: Uuid,
    #[schema(example = "Ana Souza")]
    pub display_name: String,
    #[schema(example = "Recepcionista")]
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Cessão entre unidades: concede ao funcionário o direito de trabalhar em
/// `branch_id` no período dado (`end_date = None` = sem prazo definido).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrossBranchAssignment {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub home_branch_id: Uuid,
    pub branch_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl CrossBranchAssignment {
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.is_none_or(|end| date <= end)
    }
}
