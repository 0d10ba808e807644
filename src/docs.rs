// src/docs.rs

use crate::handlers;
use crate::models;
use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Escalas ---
        handlers::scheduling::create_draft,
        handlers::scheduling::get_schedule_for_week,
        handlers::scheduling::get_week_coverage,
        handlers::scheduling::publish_schedule,
        handlers::scheduling::lock_schedule,

        // --- Alocações ---
        handlers::scheduling::add_assignment,
        handlers::scheduling::list_cell_assignments,
        handlers::scheduling::remove_assignment,
        handlers::scheduling::confirm_assignment,

        // --- Elegibilidade ---
        handlers::eligibility::eligible_for_cell,

        // --- Requisitos ---
        handlers::requirements::list_requirements,
        handlers::requirements::upsert_requirement,
    ),
    components(
        schemas(
            // --- Escalas ---
            models::scheduling::ShiftType,
            models::scheduling::ScheduleStatus,
            models::scheduling::Schedule,
            models::scheduling::ScheduleDetail,
            models::scheduling::Assignment,
            models::scheduling::AssignmentWriteResult,
            models::scheduling::PublishResult,

            // --- Cobertura ---
            models::scheduling::CellStatus,
            models::scheduling::CellCoverage,
            models::scheduling::CoverageSummary,
            models::scheduling::WeekCoverage,

            // --- Catálogo ---
            models::scheduling::ShiftRequirement,
            models::scheduling::Requirement,

            // --- Elegibilidade / diretório ---
            models::scheduling::EligibleEmployee,
            models::directory::Branch,
            models::directory::Employee,
            models::directory::CrossBranchAssignment,

            // --- Payloads ---
            handlers::scheduling::CreateDraftPayload,
            handlers::scheduling::AddAssignmentPayload,
            handlers::requirements::UpsertRequirementPayload,
        )
    ),
    tags(
        (name = "Escalas", description = "Agregado semanal e ciclo de vida (rascunho, publicação, travamento)"),
        (name = "Alocações", description = "Células da escala: alocar, remover, confirmar"),
        (name = "Elegibilidade", description = "Quem pode assumir uma célula (consultivo)"),
        (name = "Requisitos", description = "Catálogo de cobertura mínima/máxima por unidade e turno")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
