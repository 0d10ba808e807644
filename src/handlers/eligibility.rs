// src/handlers/eligibility.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::scheduling::{EligibleEmployee, ShiftType},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityQuery {
    pub branch_id: Uuid,
    pub date: NaiveDate,
    pub shift: ShiftType,
}

// GET /api/eligibility?branchId=&date=&shift=
#[utoipa::path(
    get,
    path = "/api/eligibility",
    tag = "Elegibilidade",
    params(EligibilityQuery),
    responses(
        (status = 200, description = "Candidatos ordenados: nativos, apoio, demais — sem quem já tem compromisso sobreposto", body = Vec<EligibleEmployee>),
        (status = 404, description = "Unidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn eligible_for_cell(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<EligibilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let candidates = app_state
        .eligibility_service
        .eligible_for_cell(query.branch_id, query.date, query.shift)
        .await?;
    Ok((StatusCode::OK, Json(candidates)))
}
