// src/models/scheduling.rs

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "shift_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    Day,
    Night,
}

impl ShiftType {
    /// Janela canônica do turno. O turno da noite atravessa a meia-noite
    /// (termina às 09:00 do dia seguinte).
    pub fn default_window(&self) -> (NaiveTime, NaiveTime) {
        match self {
            ShiftType::Day => (
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            ),
            ShiftType::Night => (
                NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            ),
        }
    }

    pub const ALL: [ShiftType; 2] = [ShiftType::Day, ShiftType::Night];
}

// Máquina de estados estritamente unidirecional: draft -> published -> locked.
// Um enum único (e não um par de booleanos) torna estados ilegais
// irrepresentáveis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "schedule_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Draft,
    Published,
    Locked,
}

// --- Structs persistidas ---

/// A escala semanal: o agregado de publicação.
/// `branch_scope = None` significa escopo da organização inteira.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    pub branch_scope: Option<Uuid>,
    #[schema(example = "2024-06-10")]
    pub week_start: NaiveDate,
    pub status: ScheduleStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub branch_id: Uuid,
    #[schema(example = "2024-06-10")]
    pub work_date: NaiveDate,
    pub shift_type: ShiftType,
    pub employee_id: Uuid,
    // Janela customizada: ou os dois horários, ou nenhum.
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    /// Janela efetiva do turno (customizada se houver, canônica caso
    /// contrário), já ancorada na data.
    pub fn effective_window(&self) -> (NaiveDateTime, NaiveDateTime) {
        let custom = match (self.start_time, self.end_time) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        };
        effective_window(self.work_date, self.shift_type, custom)
    }
}

/// Linha do catálogo de requisitos. `weekday = None` vale para todos os dias;
/// a linha com dia específico tem precedência (0 = segunda ... 6 = domingo).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRequirement {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub shift_type: ShiftType,
    pub weekday: Option<i16>,
    pub min_staff: i32,
    pub max_staff: Option<i32>,
    pub has_shift: bool,
}

// --- Requisito resolvido e catálogo ---

/// Requisito de cobertura já resolvido para uma célula (unidade, turno, dia).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub min_staff: i32,
    pub max_staff: Option<i32>,
    pub has_shift: bool,
}

/// Default conservador quando nenhuma linha foi configurada para a célula:
/// o turno existe e exige ao menos uma pessoa. Preferimos acusar falta de
/// cobertura a permitir silenciosamente um turno vazio.
pub const FALLBACK_REQUIREMENT: Requirement = Requirement {
    min_staff: 1,
    max_staff: None,
    has_shift: true,
};

/// Visão em memória do catálogo, com a regra de precedência:
/// linha do dia específico > linha default da unidade > FALLBACK_REQUIREMENT.
#[derive(Debug, Clone, Default)]
pub struct RequirementCatalog {
    rows: HashMap<(Uuid, ShiftType, Option<i16>), Requirement>,
}

impl RequirementCatalog {
    pub fn from_rows(rows: &[ShiftRequirement]) -> Self {
        let mut map = HashMap::new();
        for row in rows {
            map.insert(
                (row.branch_id, row.shift_type, row.weekday),
                Requirement {
                    min_staff: row.min_staff,
                    max_staff: row.max_staff,
                    has_shift: row.has_shift,
                },
            );
        }
        Self { rows: map }
    }

    pub fn resolve(&self, branch_id: Uuid, shift_type: ShiftType, date: NaiveDate) -> Requirement {
        let weekday = date.weekday().num_days_from_monday() as i16;
        self.rows
            .get(&(branch_id, shift_type, Some(weekday)))
            .or_else(|| self.rows.get(&(branch_id, shift_type, None)))
            .copied()
            .unwrap_or(FALLBACK_REQUIREMENT)
    }
}

// --- Cobertura (estado derivado, nunca persistido) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum CellStatus {
    Empty,
    Understaffed,
    Satisfied,
    Overstaffed,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CellCoverage {
    pub branch_id: Uuid,
    pub work_date: NaiveDate,
    pub shift_type: ShiftType,
    pub assigned: i32,
    pub min_staff: i32,
    pub max_staff: Option<i32>,
    pub status: CellStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub empty_cells: i32,
    pub understaffed_cells: i32,
    pub satisfied_cells: i32,
    pub overstaffed_cells: i32,
    pub total_required_cells: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeekCoverage {
    pub week_start: NaiveDate,
    pub cells: Vec<CellCoverage>,
    pub summary: CoverageSummary,
}

// --- Projeções para a camada de apresentação ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDetail {
    #[serde(flatten)]
    pub header: Schedule,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EligibleEmployee {
    pub employee_id: Uuid,
    pub display_name: String,
    pub role: String,
    pub is_branch_native: bool,
    pub is_floater: bool,
}

/// Resultado de uma escrita de alocação: o agregado atualizado mais os
/// avisos consultivos (conflitos de sobreposição etc). Avisos não bloqueiam;
/// só a invariante dura de célula única bloqueia.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentWriteResult {
    pub assignment: Assignment,
    pub warnings: Vec<String>,
    pub coverage: CoverageSummary,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub schedule: Schedule,
    pub warnings: Vec<String>,
}

// --- Calendário e janelas ---

/// Normaliza qualquer data para a segunda-feira da sua semana ISO.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// As 7 datas da semana, a partir da segunda-feira.
pub fn week_dates(week_start: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|i| week_start + Duration::days(i as i64))
}

/// Janela efetiva ancorada na data. Quando o fim não é posterior ao início
/// (turno da noite), o fim cai no dia seguinte.
pub fn effective_window(
    date: NaiveDate,
    shift_type: ShiftType,
    custom: Option<(NaiveTime, NaiveTime)>,
) -> (NaiveDateTime, NaiveDateTime) {
    let (start, end) = custom.unwrap_or_else(|| shift_type.default_window());
    let start_dt = date.and_time(start);
    let end_dt = if end > start {
        date.and_time(end)
    } else {
        (date + Duration::days(1)).and_time(end)
    };
    (start_dt, end_dt)
}

/// Teste clássico de interseção de intervalos semiabertos.
pub fn windows_overlap(a: (NaiveDateTime, NaiveDateTime), b: (NaiveDateTime, NaiveDateTime)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn normaliza_qualquer_dia_para_a_segunda() {
        // 2024-06-12 é uma quarta-feira
        assert_eq!(week_start_of(date(2024, 6, 12)), date(2024, 6, 10));
        // segunda-feira é ponto fixo
        assert_eq!(week_start_of(date(2024, 6, 10)), date(2024, 6, 10));
        // domingo pertence à semana que começou 6 dias antes
        assert_eq!(week_start_of(date(2024, 6, 16)), date(2024, 6, 10));
    }

    #[test]
    fn semana_tem_sete_datas_consecutivas() {
        let dates = week_dates(date(2024, 6, 10));
        assert_eq!(dates[0], date(2024, 6, 10));
        assert_eq!(dates[6], date(2024, 6, 16));
    }

    #[test]
    fn janela_noturna_atravessa_a_meia_noite() {
        let (start, end) = effective_window(date(2024, 6, 10), ShiftType::Night, None);
        assert_eq!(start, date(2024, 6, 10).and_hms_opt(18, 0, 0).unwrap());
        assert_eq!(end, date(2024, 6, 11).and_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn janelas_diurnas_no_mesmo_dia_se_sobrepoem() {
        let a = effective_window(date(2024, 6, 10), ShiftType::Day, None);
        let b = effective_window(date(2024, 6, 10), ShiftType::Day, None);
        assert!(windows_overlap(a, b));
    }

    #[test]
    fn noite_de_ontem_conflita_com_o_dia_de_hoje() {
        // noite de segunda termina 09:00 de terça; dia de terça começa 09:00.
        // Intervalos semiabertos: encostar não é conflito.
        let night = effective_window(date(2024, 6, 10), ShiftType::Night, None);
        let day = effective_window(date(2024, 6, 11), ShiftType::Day, None);
        assert!(!windows_overlap(night, day));

        // mas uma janela customizada que começa 08:00 já conflita
        let early = effective_window(
            date(2024, 6, 11),
            ShiftType::Day,
            Some((
                NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            )),
        );
        assert!(windows_overlap(night, early));
    }

    #[test]
    fn catalogo_prefere_linha_do_dia_especifico() {
        let branch = Uuid::new_v4();
        let rows = vec![
            ShiftRequirement {
                id: Uuid::new_v4(),
                branch_id: branch,
                shift_type: ShiftType::Day,
                weekday: None,
                min_staff: 2,
                max_staff: Some(4),
                has_shift: true,
            },
            ShiftRequirement {
                id: Uuid::new_v4(),
                branch_id: branch,
                shift_type: ShiftType::Day,
                weekday: Some(5), // sábado
                min_staff: 1,
                max_staff: Some(2),
                has_shift: true,
            },
        ];
        let catalog = RequirementCatalog::from_rows(&rows);

        // quarta-feira cai na linha default
        let wed = catalog.resolve(branch, ShiftType::Day, date(2024, 6, 12));
        assert_eq!(wed.min_staff, 2);

        // sábado cai na linha específica
        let sat = catalog.resolve(branch, ShiftType::Day, date(2024, 6, 15));
        assert_eq!(sat.min_staff, 1);
        assert_eq!(sat.max_staff, Some(2));
    }

    #[test]
    fn catalogo_sem_linha_usa_o_default_conservador() {
        let catalog = RequirementCatalog::from_rows(&[]);
        let req = catalog.resolve(Uuid::new_v4(), ShiftType::Night, date(2024, 6, 10));
        assert_eq!(req, FALLBACK_REQUIREMENT);
        assert!(req.has_shift);
        assert_eq!(req.min_staff, 1);
        assert_eq!(req.max_staff, None);
    }
}
