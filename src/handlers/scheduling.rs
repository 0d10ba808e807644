// src/handlers/scheduling.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::scheduling::{
        Assignment, AssignmentWriteResult, PublishResult, Schedule, ScheduleDetail, ShiftType,
        WeekCoverage,
    },
};

// =============================================================================
//  1. ESCALAS (agregado semanal)
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraftPayload {
    /// Qualquer data da semana; é normalizada para a segunda-feira.
    #[schema(example = "2024-06-10")]
    pub week_start: NaiveDate,
    /// Sem valor = escala da organização inteira.
    pub branch_id: Option<Uuid>,
}

// POST /api/schedules
#[utoipa::path(
    post,
    path = "/api/schedules",
    tag = "Escalas",
    request_body = CreateDraftPayload,
    responses(
        (status = 201, description = "Rascunho criado", body = Schedule),
        (status = 409, description = "Já existe escala para essa semana")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_draft(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateDraftPayload>,
) -> Result<impl IntoResponse, AppError> {
    let schedule = app_state
        .schedule_service
        .create_draft(&user.0, payload.branch_id, payload.week_start)
        .await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWeekQuery {
    /// Qualquer data da semana desejada.
    pub week: NaiveDate,
    pub branch_id: Option<Uuid>,
}

// GET /api/schedules?week=&branchId=
#[utoipa::path(
    get,
    path = "/api/schedules",
    tag = "Escalas",
    params(ScheduleWeekQuery),
    responses(
        (status = 200, description = "A escala da semana, ou null se ainda não existe rascunho", body = ScheduleDetail)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_schedule_for_week(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<ScheduleWeekQuery>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .schedule_service
        .get_for_week(query.branch_id, query.week)
        .await?;
    Ok((StatusCode::OK, Json(detail)))
}

// GET /api/schedules/{id}/coverage
#[utoipa::path(
    get,
    path = "/api/schedules/{id}/coverage",
    tag = "Escalas",
    params(("id" = Uuid, Path, description = "ID da escala")),
    responses(
        (status = 200, description = "Grade de cobertura + agregado da semana", body = WeekCoverage),
        (status = 404, description = "Escala não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_week_coverage(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(schedule_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let coverage = app_state.schedule_service.coverage_for_week(schedule_id).await?;
    Ok((StatusCode::OK, Json(coverage)))
}

// POST /api/schedules/{id}/publish
#[utoipa::path(
    post,
    path = "/api/schedules/{id}/publish",
    tag = "Escalas",
    params(("id" = Uuid, Path, description = "ID da escala")),
    responses(
        (status = 200, description = "Escala publicada (com avisos de cobertura, se houver)", body = PublishResult),
        (status = 403, description = "Chamador restrito a uma unidade"),
        (status = 409, description = "Já publicada ou já travada"),
        (status = 422, description = "Bloqueada pela política de cobertura")
    ),
    security(("api_jwt" = []))
)]
pub async fn publish_schedule(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(schedule_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = app_state.schedule_service.publish(&user.0, schedule_id).await?;
    Ok((StatusCode::OK, Json(result)))
}

// POST /api/schedules/{id}/lock
#[utoipa::path(
    post,
    path = "/api/schedules/{id}/lock",
    tag = "Escalas",
    params(("id" = Uuid, Path, description = "ID da escala")),
    responses(
        (status = 200, description = "Escala travada (estado absorvente)", body = Schedule),
        (status = 409, description = "Já travada")
    ),
    security(("api_jwt" = []))
)]
pub async fn lock_schedule(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(schedule_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let schedule = app_state.schedule_service.lock(&user.0, schedule_id).await?;
    Ok((StatusCode::OK, Json(schedule)))
}

// =============================================================================
//  2. ALOCAÇÕES (células da escala)
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddAssignmentPayload {
    pub branch_id: Uuid,
    #[schema(example = "2024-06-10")]
    pub work_date: NaiveDate,
    pub shift_type: ShiftType,
    pub employee_id: Uuid,
    /// Janela customizada: ou os dois horários, ou nenhum.
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

// POST /api/schedules/{id}/assignments
#[utoipa::path(
    post,
    path = "/api/schedules/{id}/assignments",
    tag = "Alocações",
    params(("id" = Uuid, Path, description = "ID da escala")),
    request_body = AddAssignmentPayload,
    responses(
        (status = 201, description = "Alocação criada; avisos consultivos não bloqueiam", body = AssignmentWriteResult),
        (status = 409, description = "Funcionário já alocado nessa célula, ou escala fora do rascunho"),
        (status = 422, description = "Turno inexistente, janela inválida ou data fora da semana")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_assignment(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(schedule_id): Path<Uuid>,
    Json(payload): Json<AddAssignmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let result = app_state
        .schedule_service
        .add_assignment(
            &user.0,
            schedule_id,
            payload.branch_id,
            payload.work_date,
            payload.shift_type,
            payload.employee_id,
            payload.start_time,
            payload.end_time,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CellQuery {
    pub date: Option<NaiveDate>,
    pub branch_id: Option<Uuid>,
    pub shift: Option<ShiftType>,
}

// GET /api/schedules/{id}/assignments?date=&branchId=&shift=
#[utoipa::path(
    get,
    path = "/api/schedules/{id}/assignments",
    tag = "Alocações",
    params(("id" = Uuid, Path, description = "ID da escala"), CellQuery),
    responses(
        (status = 200, description = "Alocações da célula (filtros opcionais)", body = Vec<Assignment>),
        (status = 404, description = "Escala não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_cell_assignments(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(schedule_id): Path<Uuid>,
    Query(query): Query<CellQuery>,
) -> Result<impl IntoResponse, AppError> {
    let assignments = app_state
        .schedule_service
        .assignments_for_cell(schedule_id, query.date, query.branch_id, query.shift)
        .await?;
    Ok((StatusCode::OK, Json(assignments)))
}

// DELETE /api/assignments/{id}
#[utoipa::path(
    delete,
    path = "/api/assignments/{id}",
    tag = "Alocações",
    params(("id" = Uuid, Path, description = "ID da alocação")),
    responses(
        (status = 204, description = "Alocação removida"),
        (status = 409, description = "Escala fora do rascunho")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_assignment(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(assignment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .schedule_service
        .remove_assignment(&user.0, assignment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/assignments/{id}/confirm
#[utoipa::path(
    post,
    path = "/api/assignments/{id}/confirm",
    tag = "Alocações",
    params(("id" = Uuid, Path, description = "ID da alocação")),
    responses(
        (status = 200, description = "Alocação confirmada (idempotente)", body = Assignment),
        (status = 409, description = "Escala travada")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_assignment(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(assignment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state
        .schedule_service
        .confirm_assignment(&user.0, assignment_id)
        .await?;
    Ok((StatusCode::OK, Json(assignment)))
}
