// src/services/coverage.rs
//
// Calculadora de cobertura: função pura sobre (alocações, catálogo de
// requisitos, as 7 datas da semana, os dois turnos). Cobertura é estado
// derivado — nunca persistida, recalculada a cada leitura, então não existe
// bug de atualização parcial.

use crate::models::scheduling::{
    Assignment, CellCoverage, CellStatus, CoverageSummary, Requirement, RequirementCatalog,
    ShiftType, WeekCoverage, week_dates,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

/// Status de uma célula a partir do requisito resolvido e da contagem.
/// `empty` tem precedência sobre `understaffed`: zero pessoas numa célula
/// que existe é o caso operacionalmente grave.
pub fn cell_status(requirement: &Requirement, count: i32) -> CellStatus {
    if count == 0 {
        CellStatus::Empty
    } else if count < requirement.min_staff {
        CellStatus::Understaffed
    } else if requirement.max_staff.is_some_and(|max| count > max) {
        CellStatus::Overstaffed
    } else {
        CellStatus::Satisfied
    }
}

/// Grade completa da semana: unidades × 7 dias × 2 turnos, pulando as
/// células com `has_shift = false` (não contam nem como vazias).
pub fn compute_week_coverage(
    catalog: &RequirementCatalog,
    branch_ids: &[Uuid],
    assignments: &[Assignment],
    week_start: NaiveDate,
) -> WeekCoverage {
    let mut counts: HashMap<(Uuid, NaiveDate, ShiftType), i32> = HashMap::new();
    for a in assignments {
        *counts.entry((a.branch_id, a.work_date, a.shift_type)).or_insert(0) += 1;
    }

    let mut cells = Vec::new();
    let mut summary = CoverageSummary::default();

    for &branch_id in branch_ids {
        for date in week_dates(week_start) {
            for shift_type in ShiftType::ALL {
                let requirement = catalog.resolve(branch_id, shift_type, date);
                if !requirement.has_shift {
                    continue;
                }
                let assigned = counts
                    .get(&(branch_id, date, shift_type))
                    .copied()
                    .unwrap_or(0);
                let status = cell_status(&requirement, assigned);

                summary.total_required_cells += 1;
                match status {
                    CellStatus::Empty => summary.empty_cells += 1,
                    CellStatus::Understaffed => summary.understaffed_cells += 1,
                    CellStatus::Satisfied => summary.satisfied_cells += 1,
                    CellStatus::Overstaffed => summary.overstaffed_cells += 1,
                }

                cells.push(CellCoverage {
                    branch_id,
                    work_date: date,
                    shift_type,
                    assigned,
                    min_staff: requirement.min_staff,
                    max_staff: requirement.max_staff,
                    status,
                });
            }
        }
    }

    WeekCoverage { week_start, cells, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scheduling::ShiftRequirement;
    use chrono::{DateTime, Utc};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn assignment(branch_id: Uuid, date: NaiveDate, shift_type: ShiftType) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            branch_id,
            work_date: date,
            shift_type,
            employee_id: Uuid::new_v4(),
            start_time: None,
            end_time: None,
            confirmed_at: None,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    fn requirement_row(
        branch_id: Uuid,
        shift_type: ShiftType,
        min_staff: i32,
        max_staff: Option<i32>,
        has_shift: bool,
    ) -> ShiftRequirement {
        ShiftRequirement {
            id: Uuid::new_v4(),
            branch_id,
            shift_type,
            weekday: None,
            min_staff,
            max_staff,
            has_shift,
        }
    }

    #[test]
    fn celula_progride_de_vazia_a_superlotada() {
        // Cenário: turno diurno com min=2, max=3.
        let branch = Uuid::new_v4();
        let catalog = RequirementCatalog::from_rows(&[
            requirement_row(branch, ShiftType::Day, 2, Some(3), true),
            requirement_row(branch, ShiftType::Night, 0, None, false),
        ]);
        let status_on_monday = |assignments: &[Assignment]| {
            let coverage = compute_week_coverage(&catalog, &[branch], assignments, monday());
            coverage
                .cells
                .iter()
                .find(|c| c.work_date == monday() && c.shift_type == ShiftType::Day)
                .unwrap()
                .status
        };

        let mut assignments = Vec::new();
        assert_eq!(status_on_monday(&assignments), CellStatus::Empty);

        assignments.push(assignment(branch, monday(), ShiftType::Day));
        assert_eq!(status_on_monday(&assignments), CellStatus::Understaffed);

        assignments.push(assignment(branch, monday(), ShiftType::Day));
        assert_eq!(status_on_monday(&assignments), CellStatus::Satisfied);

        assignments.push(assignment(branch, monday(), ShiftType::Day));
        assignments.push(assignment(branch, monday(), ShiftType::Day));
        assert_eq!(status_on_monday(&assignments), CellStatus::Overstaffed);
    }

    #[test]
    fn turno_inexistente_fica_fora_da_grade() {
        let branch = Uuid::new_v4();
        let catalog = RequirementCatalog::from_rows(&[
            requirement_row(branch, ShiftType::Day, 1, None, true),
            requirement_row(branch, ShiftType::Night, 0, None, false),
        ]);
        let coverage = compute_week_coverage(&catalog, &[branch], &[], monday());

        // só os 7 turnos diurnos contam como células exigidas
        assert_eq!(coverage.summary.total_required_cells, 7);
        assert!(coverage.cells.iter().all(|c| c.shift_type == ShiftType::Day));
    }

    #[test]
    fn satisfeita_se_e_somente_se_dentro_dos_limites() {
        let requirement = Requirement { min_staff: 2, max_staff: Some(4), has_shift: true };
        for count in 0..=6 {
            let status = cell_status(&requirement, count);
            let within = count >= 2 && count <= 4;
            assert_eq!(status == CellStatus::Satisfied, within, "count = {count}");
        }

        // sem max_staff, qualquer contagem >= min satisfaz
        let unbounded = Requirement { min_staff: 1, max_staff: None, has_shift: true };
        assert_eq!(cell_status(&unbounded, 50), CellStatus::Satisfied);
    }

    #[test]
    fn recomputo_sobre_dados_iguais_e_identico() {
        let branch = Uuid::new_v4();
        let catalog = RequirementCatalog::from_rows(&[requirement_row(
            branch,
            ShiftType::Day,
            2,
            Some(3),
            true,
        )]);
        let assignments = vec![assignment(branch, monday(), ShiftType::Day)];

        let first = compute_week_coverage(&catalog, &[branch], &assignments, monday());
        let second = compute_week_coverage(&catalog, &[branch], &assignments, monday());
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.cells.len(), second.cells.len());
    }

    #[test]
    fn agregado_soma_todas_as_celulas() {
        let branch = Uuid::new_v4();
        // default de fallback: min=1, ambos os turnos existem
        let catalog = RequirementCatalog::from_rows(&[]);
        let assignments = vec![
            assignment(branch, monday(), ShiftType::Day),
            assignment(branch, monday(), ShiftType::Night),
        ];
        let coverage = compute_week_coverage(&catalog, &[branch], &assignments, monday());

        assert_eq!(coverage.summary.total_required_cells, 14);
        assert_eq!(coverage.summary.satisfied_cells, 2);
        assert_eq!(coverage.summary.empty_cells, 12);
        assert_eq!(
            coverage.summary.total_required_cells,
            coverage.summary.empty_cells
                + coverage.summary.understaffed_cells
                + coverage.summary.satisfied_cells
                + coverage.summary.overstaffed_cells
        );
    }
}
