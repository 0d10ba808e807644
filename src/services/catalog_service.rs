// src/services/catalog_service.rs
//
// Superfície de configuração de unidade sobre o catálogo de requisitos.
// O motor de escalas só lê o catálogo; quem escreve é esta ponta, restrita
// ao escopo da organização.

use crate::{
    common::error::AppError,
    db::{DirectoryRepository, RequirementRepository},
    models::auth::CurrentUser,
    models::scheduling::{ShiftRequirement, ShiftType},
};
use uuid::Uuid;

#[derive(Clone)]
pub struct CatalogService {
    requirement_repo: RequirementRepository,
    directory_repo: DirectoryRepository,
}

impl CatalogService {
    pub fn new(requirement_repo: RequirementRepository, directory_repo: DirectoryRepository) -> Self {
        Self { requirement_repo, directory_repo }
    }

    pub async fn list_for_branch(&self, branch_id: Uuid) -> Result<Vec<ShiftRequirement>, AppError> {
        self.directory_repo
            .get_branch(branch_id)
            .await?
            .ok_or(AppError::BranchNotFound)?;
        self.requirement_repo.list_for_branch(branch_id).await
    }

    pub async fn upsert(
        &self,
        caller: &CurrentUser,
        branch_id: Uuid,
        shift_type: ShiftType,
        weekday: Option<i16>,
        min_staff: i32,
        max_staff: Option<i32>,
        has_shift: bool,
    ) -> Result<ShiftRequirement, AppError> {
        if !caller.scope.is_org_wide() {
            return Err(AppError::PermissionDenied);
        }
        self.directory_repo
            .get_branch(branch_id)
            .await?
            .ok_or(AppError::BranchNotFound)?;

        let row = self
            .requirement_repo
            .upsert(branch_id, shift_type, weekday, min_staff, max_staff, has_shift)
            .await?;
        tracing::info!(
            "Catálogo atualizado: unidade {} turno {:?} (weekday {:?})",
            branch_id,
            shift_type,
            weekday
        );
        Ok(row)
    }
}
