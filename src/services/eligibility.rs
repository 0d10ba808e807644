// src/services/eligibility.rs
//
// Resolvedor de elegibilidade: quem pode assumir uma célula (unidade, data,
// turno). O resultado é consultivo — a UI mostra a lista e os conflitos como
// aviso; a única invariante dura continua sendo a unicidade por célula, que
// o caminho de escrita revalida.

use crate::{
    common::error::AppError,
    db::{DirectoryRepository, ScheduleRepository},
    models::directory::Employee,
    models::scheduling::{Assignment, EligibleEmployee, ShiftType, effective_window, windows_overlap},
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use uuid::Uuid;

/// Ordena os candidatos: nativos da unidade primeiro, depois quem tem cessão
/// ativa ("apoio"), depois o resto; empate por nome.
pub fn rank_candidates(
    branch_id: Uuid,
    employees: &[Employee],
    floater_ids: &HashSet<Uuid>,
    busy_ids: &HashSet<Uuid>,
) -> Vec<EligibleEmployee> {
    let mut candidates: Vec<EligibleEmployee> = employees
        .iter()
        .filter(|e| !busy_ids.contains(&e.id))
        .map(|e| EligibleEmployee {
            employee_id: e.id,
            display_name: e.display_name.clone(),
            role: e.role.clone(),
            is_branch_native: e.branch_id == branch_id,
            is_floater: floater_ids.contains(&e.id),
        })
        .collect();

    candidates.sort_by(|a, b| {
        let tier = |c: &EligibleEmployee| match (c.is_branch_native, c.is_floater) {
            (true, _) => 0u8,
            (false, true) => 1,
            (false, false) => 2,
        };
        tier(a).cmp(&tier(b)).then_with(|| a.display_name.cmp(&b.display_name))
    });
    candidates
}

/// Alocações existentes que colidem com a janela alvo. Usada pelo caminho de
/// escrita para anexar avisos à resposta (aviso, não bloqueio: a célula
/// alocada fica em outra unidade, então a invariante de célula única não se
/// aplica).
pub fn overlapping_assignments<'a>(
    target: (NaiveDateTime, NaiveDateTime),
    existing: &'a [Assignment],
) -> Vec<&'a Assignment> {
    existing
        .iter()
        .filter(|a| windows_overlap(target, a.effective_window()))
        .collect()
}

#[derive(Clone)]
pub struct EligibilityService {
    directory_repo: DirectoryRepository,
    schedule_repo: ScheduleRepository,
}

impl EligibilityService {
    pub fn new(directory_repo: DirectoryRepository, schedule_repo: ScheduleRepository) -> Self {
        Self { directory_repo, schedule_repo }
    }

    /// Lista ordenada de quem pode assumir a célula, já excluindo quem tem
    /// compromisso sobreposto em qualquer unidade.
    pub async fn eligible_for_cell(
        &self,
        branch_id: Uuid,
        date: NaiveDate,
        shift_type: ShiftType,
    ) -> Result<Vec<EligibleEmployee>, AppError> {
        self.directory_repo
            .get_branch(branch_id)
            .await?
            .ok_or(AppError::BranchNotFound)?;

        let employees = self.directory_repo.list_active_employees().await?;
        let floater_ids: HashSet<Uuid> = self
            .directory_repo
            .grants_for_branch(branch_id)
            .await?
            .into_iter()
            .filter(|g| g.covers(date))
            .map(|g| g.employee_id)
            .collect();

        // O turno da noite do dia anterior invade esta data, então a
        // varredura olha um dia para cada lado.
        let target = effective_window(date, shift_type, None);
        let nearby = self
            .schedule_repo
            .assignments_between(date - Duration::days(1), date + Duration::days(1))
            .await?;
        let busy_ids: HashSet<Uuid> = nearby
            .iter()
            .filter(|a| windows_overlap(target, a.effective_window()))
            .map(|a| a.employee_id)
            .collect();

        Ok(rank_candidates(branch_id, &employees, &floater_ids, &busy_ids))
    }

    /// Avisos consultivos para a alocação recém-criada: sobreposição de
    /// janela em outra unidade e funcionário fora do quadro da unidade.
    pub async fn warnings_for_assignment(
        &self,
        assignment: &Assignment,
        employee: &Employee,
    ) -> Result<Vec<String>, AppError> {
        let mut warnings = Vec::new();

        let existing = self
            .schedule_repo
            .assignments_for_employee_between(
                assignment.employee_id,
                assignment.work_date - Duration::days(1),
                assignment.work_date + Duration::days(1),
            )
            .await?;
        let target = assignment.effective_window();
        for conflict in overlapping_assignments(target, &existing) {
            if conflict.id == assignment.id {
                continue;
            }
            warnings.push(format!(
                "{} já está alocado(a) em outra célula com janela sobreposta em {} ({:?})",
                employee.display_name, conflict.work_date, conflict.shift_type
            ));
        }

        if employee.branch_id != assignment.branch_id {
            let grants = self
                .directory_repo
                .grants_for_branch(assignment.branch_id)
                .await?;
            if !grants
                .iter()
                .any(|g| g.employee_id == employee.id && g.covers(assignment.work_date))
            {
                warnings.push(format!(
                    "{} não pertence ao quadro da unidade e não tem cessão ativa para a data",
                    employee.display_name
                ));
            }
        }

        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn employee(branch_id: Uuid, name: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            branch_id,
            display_name: name.to_string(),
            role: "Recepcionista".to_string(),
            is_active: true,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    fn assignment_at(
        employee_id: Uuid,
        branch_id: Uuid,
        date: NaiveDate,
        shift_type: ShiftType,
    ) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            branch_id,
            work_date: date,
            shift_type,
            employee_id,
            start_time: None,
            end_time: None,
            confirmed_at: None,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[test]
    fn nativos_depois_apoio_depois_o_resto() {
        let home = Uuid::new_v4();
        let other = Uuid::new_v4();

        let native = employee(home, "Zélia");
        let floater = employee(other, "Bruno");
        let outsider = employee(other, "Amanda");

        let employees = vec![outsider.clone(), floater.clone(), native.clone()];
        let floater_ids = HashSet::from([floater.id]);

        let ranked = rank_candidates(home, &employees, &floater_ids, &HashSet::new());
        let names: Vec<_> = ranked.iter().map(|c| c.display_name.as_str()).collect();
        // nativa primeiro mesmo com nome "maior"; apoio antes dos demais
        assert_eq!(names, vec!["Zélia", "Bruno", "Amanda"]);

        assert!(ranked[0].is_branch_native);
        assert!(!ranked[1].is_branch_native);
        assert!(ranked[1].is_floater);
        assert!(!ranked[2].is_floater);
    }

    #[test]
    fn empate_no_mesmo_grupo_resolve_por_nome() {
        let home = Uuid::new_v4();
        let ana = employee(home, "Ana");
        let carla = employee(home, "Carla");

        let ranked = rank_candidates(
            home,
            &[carla.clone(), ana.clone()],
            &HashSet::new(),
            &HashSet::new(),
        );
        assert_eq!(ranked[0].display_name, "Ana");
        assert_eq!(ranked[1].display_name, "Carla");
    }

    #[test]
    fn ocupados_ficam_fora_da_lista() {
        let home = Uuid::new_v4();
        let free = employee(home, "Ana");
        let busy = employee(home, "Bia");

        let ranked = rank_candidates(
            home,
            &[free.clone(), busy.clone()],
            &HashSet::new(),
            &HashSet::from([busy.id]),
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].employee_id, free.id);
    }

    #[test]
    fn turno_diurno_em_outra_unidade_no_mesmo_dia_conflita() {
        // Cenário: E no turno diurno da unidade B em 2024-06-10; a mesma
        // janela na unidade D é conflito consultivo, não violação de célula.
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let employee_id = Uuid::new_v4();
        let existing = vec![assignment_at(employee_id, Uuid::new_v4(), date, ShiftType::Day)];

        let target = effective_window(date, ShiftType::Day, None);
        let conflicts = overlapping_assignments(target, &existing);
        assert_eq!(conflicts.len(), 1);

        // o turno da noite do mesmo dia não cruza com o diurno
        let night = effective_window(date, ShiftType::Night, None);
        assert!(overlapping_assignments(night, &existing).is_empty());
    }
}
