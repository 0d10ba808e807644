// src/handlers/requirements.rs
//
// Superfície de configuração do catálogo de requisitos. O motor só lê o
// catálogo; o upsert daqui é a ponta de configuração de unidade, restrita ao
// escopo da organização.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::scheduling::{ShiftRequirement, ShiftType},
};

fn default_has_shift() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRequirementPayload {
    pub shift_type: ShiftType,

    /// 0 = segunda ... 6 = domingo; sem valor = vale para todos os dias.
    #[validate(range(min = 0, max = 6, message = "O dia da semana vai de 0 (segunda) a 6 (domingo)."))]
    pub weekday: Option<i16>,

    #[validate(range(min = 0, message = "O mínimo de pessoal não pode ser negativo."))]
    #[schema(example = 2)]
    pub min_staff: i32,

    #[schema(example = 3)]
    pub max_staff: Option<i32>,

    #[serde(default = "default_has_shift")]
    #[schema(example = true)]
    pub has_shift: bool,
}

// Validação de consistência entre campos, no padrão dos outros payloads.
impl UpsertRequirementPayload {
    fn validate_consistency(&self) -> Result<(), ValidationError> {
        if let Some(max) = self.max_staff {
            if max < self.min_staff {
                let mut err = ValidationError::new("range");
                err.message = Some("O máximo de pessoal não pode ser menor que o mínimo.".into());
                return Err(err);
            }
        }
        Ok(())
    }
}

// GET /api/requirements/{branchId}
#[utoipa::path(
    get,
    path = "/api/requirements/{branchId}",
    tag = "Requisitos",
    params(("branchId" = Uuid, Path, description = "ID da unidade")),
    responses(
        (status = 200, description = "Linhas do catálogo da unidade", body = Vec<ShiftRequirement>),
        (status = 404, description = "Unidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_requirements(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(branch_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.catalog_service.list_for_branch(branch_id).await?;
    Ok((StatusCode::OK, Json(rows)))
}

// PUT /api/requirements/{branchId}
#[utoipa::path(
    put,
    path = "/api/requirements/{branchId}",
    tag = "Requisitos",
    params(("branchId" = Uuid, Path, description = "ID da unidade")),
    request_body = UpsertRequirementPayload,
    responses(
        (status = 200, description = "Linha do catálogo criada ou atualizada", body = ShiftRequirement),
        (status = 403, description = "Chamador restrito a uma unidade")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_requirement(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(branch_id): Path<Uuid>,
    Json(payload): Json<UpsertRequirementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    payload.validate_consistency().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("maxStaff", e);
        AppError::ValidationError(errors)
    })?;

    let row = app_state
        .catalog_service
        .upsert(
            &user.0,
            branch_id,
            payload.shift_type,
            payload.weekday,
            payload.min_staff,
            payload.max_staff,
            payload.has_shift,
        )
        .await?;
    Ok((StatusCode::OK, Json(row)))
}
