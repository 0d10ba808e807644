// src/services/schedule_service.rs
//
// Gestão da escala semanal e controlador de ciclo de vida
// (draft -> published -> locked, sem volta). Toda mutação roda numa
// transação que trava a linha da escala antes de checar o status, para que
// dois editores concorrentes se serializem e o perdedor receba o erro
// tipado em vez de sobrescrever.

use crate::{
    common::error::AppError,
    db::{DirectoryRepository, RequirementRepository, ScheduleRepository},
    models::auth::{CallerScope, CurrentUser},
    models::scheduling::{
        Assignment, AssignmentWriteResult, CoverageSummary, PublishResult, Requirement,
        RequirementCatalog, Schedule, ScheduleDetail, ScheduleStatus, ShiftType, WeekCoverage,
        week_start_of,
    },
    services::{EligibilityService, NotificationService, coverage},
};
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

/// Política de publicação (questão em aberto no comportamento de origem,
/// tornada explícita e configurável): bloquear em célula vazia é o default;
/// células abaixo do mínimo sempre viram só aviso.
#[derive(Debug, Clone, Copy)]
pub struct PublishPolicy {
    pub block_on_empty: bool,
}

impl Default for PublishPolicy {
    fn default() -> Self {
        Self { block_on_empty: true }
    }
}

#[derive(Clone)]
pub struct ScheduleService {
    pool: sqlx::PgPool,
    schedule_repo: ScheduleRepository,
    requirement_repo: RequirementRepository,
    directory_repo: DirectoryRepository,
    eligibility: EligibilityService,
    notifier: NotificationService,
    policy: PublishPolicy,
}

// ---
// Guardas puras do ciclo de vida
// ---

fn ensure_draft(status: ScheduleStatus) -> Result<(), AppError> {
    match status {
        ScheduleStatus::Draft => Ok(()),
        _ => Err(AppError::ScheduleNotEditable),
    }
}

// Confirmação é um aceite do funcionário/gerente e pode legitimamente
// acontecer depois da publicação; só o estado travado a impede.
fn ensure_confirmable(status: ScheduleStatus) -> Result<(), AppError> {
    match status {
        ScheduleStatus::Draft | ScheduleStatus::Published => Ok(()),
        ScheduleStatus::Locked => Err(AppError::ScheduleNotEditable),
    }
}

fn ensure_publishable(status: ScheduleStatus) -> Result<(), AppError> {
    match status {
        ScheduleStatus::Draft => Ok(()),
        ScheduleStatus::Published => Err(AppError::AlreadyPublished),
        ScheduleStatus::Locked => Err(AppError::AlreadyLocked),
    }
}

fn ensure_lockable(status: ScheduleStatus) -> Result<(), AppError> {
    match status {
        ScheduleStatus::Locked => Err(AppError::AlreadyLocked),
        _ => Ok(()),
    }
}

/// A célula aceita a alocação? Janela customizada vem em par e com duração
/// não nula (início == fim viraria um turno de 24h na ancoragem da janela);
/// e a unidade precisa operar o turno naquele dia.
fn ensure_cell_admissible(
    requirement: &Requirement,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
) -> Result<(), AppError> {
    match (start_time, end_time) {
        (None, None) => {}
        (Some(start), Some(end)) if start != end => {}
        _ => return Err(AppError::InvalidWindow),
    }
    if !requirement.has_shift {
        return Err(AppError::ShiftNotOffered);
    }
    Ok(())
}

fn ensure_org_scope(caller: &CurrentUser) -> Result<(), AppError> {
    if caller.scope.is_org_wide() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Gerente de unidade só mexe nas células da própria unidade; o escopo da
/// organização mexe em qualquer uma.
fn ensure_branch_access(caller: &CurrentUser, branch_id: Uuid) -> Result<(), AppError> {
    match caller.scope {
        CallerScope::Organization => Ok(()),
        CallerScope::Branch(own) if own == branch_id => Ok(()),
        CallerScope::Branch(_) => Err(AppError::PermissionDenied),
    }
}

/// Aplica a política de publicação sobre o agregado: erro tipado se a
/// política bloquear, senão a lista de avisos que acompanha a resposta.
fn check_publish_coverage(
    policy: &PublishPolicy,
    summary: &CoverageSummary,
) -> Result<Vec<String>, AppError> {
    if policy.block_on_empty && summary.empty_cells > 0 {
        return Err(AppError::InsufficientCoverage { empty_cells: summary.empty_cells });
    }
    let mut warnings = Vec::new();
    if summary.empty_cells > 0 {
        warnings.push(format!("{} célula(s) sem ninguém alocado", summary.empty_cells));
    }
    if summary.understaffed_cells > 0 {
        warnings.push(format!(
            "{} célula(s) abaixo do mínimo de pessoal",
            summary.understaffed_cells
        ));
    }
    Ok(warnings)
}

impl ScheduleService {
    pub fn new(
        pool: sqlx::PgPool,
        schedule_repo: ScheduleRepository,
        requirement_repo: RequirementRepository,
        directory_repo: DirectoryRepository,
        eligibility: EligibilityService,
        notifier: NotificationService,
        policy: PublishPolicy,
    ) -> Self {
        Self {
            pool,
            schedule_repo,
            requirement_repo,
            directory_repo,
            eligibility,
            notifier,
            policy,
        }
    }

    // ---
    // Consultas
    // ---

    /// "Get or null": a semana sem escala não é erro — é o sinal para a UI
    /// oferecer a criação do rascunho.
    pub async fn get_for_week(
        &self,
        branch_scope: Option<Uuid>,
        week: NaiveDate,
    ) -> Result<Option<ScheduleDetail>, AppError> {
        let week_start = week_start_of(week);
        let Some(schedule) = self.schedule_repo.get_for_week(branch_scope, week_start).await? else {
            return Ok(None);
        };
        let assignments = self.schedule_repo.list_assignments(schedule.id).await?;
        Ok(Some(ScheduleDetail { header: schedule, assignments }))
    }

    pub async fn coverage_for_week(&self, schedule_id: Uuid) -> Result<WeekCoverage, AppError> {
        let schedule = self
            .schedule_repo
            .get_by_id(schedule_id)
            .await?
            .ok_or(AppError::ScheduleNotFound)?;
        let assignments = self.schedule_repo.list_assignments(schedule_id).await?;
        self.compute_coverage(&schedule, &assignments).await
    }

    pub async fn assignments_for_cell(
        &self,
        schedule_id: Uuid,
        date: Option<NaiveDate>,
        branch_id: Option<Uuid>,
        shift_type: Option<ShiftType>,
    ) -> Result<Vec<Assignment>, AppError> {
        self.schedule_repo
            .get_by_id(schedule_id)
            .await?
            .ok_or(AppError::ScheduleNotFound)?;
        let assignments = self.schedule_repo.list_assignments(schedule_id).await?;
        Ok(assignments
            .into_iter()
            .filter(|a| date.is_none_or(|d| a.work_date == d))
            .filter(|a| branch_id.is_none_or(|b| a.branch_id == b))
            .filter(|a| shift_type.is_none_or(|s| a.shift_type == s))
            .collect())
    }

    // ---
    // Comandos
    // ---

    /// Criação explícita do rascunho (nunca implícita). A data é normalizada
    /// para a segunda-feira da semana ISO.
    pub async fn create_draft(
        &self,
        caller: &CurrentUser,
        branch_scope: Option<Uuid>,
        week: NaiveDate,
    ) -> Result<Schedule, AppError> {
        match (caller.scope, branch_scope) {
            (CallerScope::Organization, _) => {}
            (CallerScope::Branch(own), Some(requested)) if own == requested => {}
            // gerente de unidade não cria rascunho de outra unidade nem da
            // organização inteira
            _ => return Err(AppError::PermissionDenied),
        }
        if let Some(branch_id) = branch_scope {
            self.directory_repo
                .get_branch(branch_id)
                .await?
                .ok_or(AppError::BranchNotFound)?;
        }

        let week_start = week_start_of(week);
        let schedule = self
            .schedule_repo
            .create_draft(&self.pool, branch_scope, week_start)
            .await?;
        tracing::info!("Rascunho criado para a semana de {}", week_start);
        Ok(schedule)
    }

    pub async fn add_assignment(
        &self,
        caller: &CurrentUser,
        schedule_id: Uuid,
        branch_id: Uuid,
        work_date: NaiveDate,
        shift_type: ShiftType,
        employee_id: Uuid,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    ) -> Result<AssignmentWriteResult, AppError> {
        ensure_branch_access(caller, branch_id)?;

        let employee = self
            .directory_repo
            .get_employee(employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound)?;

        let mut tx = self.pool.begin().await?;

        let schedule = self
            .schedule_repo
            .get_by_id_for_update(&mut *tx, schedule_id)
            .await?
            .ok_or(AppError::ScheduleNotFound)?;
        ensure_draft(schedule.status)?;

        if let Some(scope) = schedule.branch_scope {
            if scope != branch_id {
                return Err(AppError::BranchOutsideScope);
            }
        }
        if week_start_of(work_date) != schedule.week_start {
            return Err(AppError::DateOutsideScheduleWeek(work_date));
        }

        let rows = self
            .requirement_repo
            .list_for_branch_with(&mut *tx, branch_id)
            .await?;
        let requirement = RequirementCatalog::from_rows(&rows).resolve(branch_id, shift_type, work_date);
        ensure_cell_admissible(&requirement, start_time, end_time)?;

        let assignment = self
            .schedule_repo
            .insert_assignment(
                &mut *tx, schedule_id, branch_id, work_date, shift_type, employee_id, start_time,
                end_time,
            )
            .await?;

        tx.commit().await?;

        // Avisos consultivos e cobertura recalculada ficam fora da
        // transação: são leituras derivadas, não invariantes.
        let warnings = self.eligibility.warnings_for_assignment(&assignment, &employee).await?;
        let assignments = self.schedule_repo.list_assignments(schedule_id).await?;
        let coverage = self.compute_coverage(&schedule, &assignments).await?.summary;

        Ok(AssignmentWriteResult { assignment, warnings, coverage })
    }

    pub async fn remove_assignment(
        &self,
        caller: &CurrentUser,
        assignment_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let assignment = self
            .schedule_repo
            .get_assignment(&mut *tx, assignment_id)
            .await?
            .ok_or(AppError::AssignmentNotFound)?;
        ensure_branch_access(caller, assignment.branch_id)?;

        let schedule = self
            .schedule_repo
            .get_by_id_for_update(&mut *tx, assignment.schedule_id)
            .await?
            .ok_or(AppError::ScheduleNotFound)?;
        ensure_draft(schedule.status)?;

        self.schedule_repo.delete_assignment(&mut *tx, assignment_id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn confirm_assignment(
        &self,
        caller: &CurrentUser,
        assignment_id: Uuid,
    ) -> Result<Assignment, AppError> {
        let mut tx = self.pool.begin().await?;

        let assignment = self
            .schedule_repo
            .get_assignment(&mut *tx, assignment_id)
            .await?
            .ok_or(AppError::AssignmentNotFound)?;
        ensure_branch_access(caller, assignment.branch_id)?;

        let schedule = self
            .schedule_repo
            .get_by_id_for_update(&mut *tx, assignment.schedule_id)
            .await?
            .ok_or(AppError::ScheduleNotFound)?;
        ensure_confirmable(schedule.status)?;

        let confirmed = self.schedule_repo.confirm_assignment(&mut *tx, assignment_id).await?;
        tx.commit().await?;
        Ok(confirmed)
    }

    /// Publicação: ação do escopo da organização, efetivamente única. Uma
    /// segunda chamada concorrente encontra a linha já publicada e recebe
    /// `AlreadyPublished` sem re-disparar a notificação.
    pub async fn publish(
        &self,
        caller: &CurrentUser,
        schedule_id: Uuid,
    ) -> Result<PublishResult, AppError> {
        ensure_org_scope(caller)?;

        let mut tx = self.pool.begin().await?;

        let schedule = self
            .schedule_repo
            .get_by_id_for_update(&mut *tx, schedule_id)
            .await?
            .ok_or(AppError::ScheduleNotFound)?;
        ensure_publishable(schedule.status)?;

        let assignments = self.schedule_repo.list_assignments_with(&mut *tx, schedule_id).await?;
        let summary = self.compute_coverage(&schedule, &assignments).await?.summary;
        let warnings = check_publish_coverage(&self.policy, &summary)?;

        let published = self
            .schedule_repo
            .set_status(&mut *tx, schedule_id, ScheduleStatus::Published, true)
            .await?;
        tx.commit().await?;

        tracing::info!("Escala {} publicada pelo usuário {}", schedule_id, caller.id);
        self.notifier.schedule_published(&published);

        Ok(PublishResult { schedule: published, warnings })
    }

    /// Travamento administrativo (ou da semana já encerrada): estado
    /// absorvente, nada mais muda. Permitido direto do rascunho — uma semana
    /// pode terminar sem nunca ter sido publicada.
    pub async fn lock(&self, caller: &CurrentUser, schedule_id: Uuid) -> Result<Schedule, AppError> {
        ensure_org_scope(caller)?;

        let mut tx = self.pool.begin().await?;

        let schedule = self
            .schedule_repo
            .get_by_id_for_update(&mut *tx, schedule_id)
            .await?
            .ok_or(AppError::ScheduleNotFound)?;
        ensure_lockable(schedule.status)?;

        let locked = self
            .schedule_repo
            .set_status(&mut *tx, schedule_id, ScheduleStatus::Locked, false)
            .await?;
        tx.commit().await?;

        tracing::info!("Escala {} travada pelo usuário {}", schedule_id, caller.id);
        Ok(locked)
    }

    // ---
    // Cobertura (projeção derivada)
    // ---

    async fn compute_coverage(
        &self,
        schedule: &Schedule,
        assignments: &[Assignment],
    ) -> Result<WeekCoverage, AppError> {
        let (branch_ids, rows) = match schedule.branch_scope {
            Some(branch_id) => (
                vec![branch_id],
                self.requirement_repo.list_for_branch(branch_id).await?,
            ),
            None => (
                self.directory_repo
                    .list_branches()
                    .await?
                    .into_iter()
                    .map(|b| b.id)
                    .collect(),
                self.requirement_repo.list_all().await?,
            ),
        };
        let catalog = RequirementCatalog::from_rows(&rows);
        Ok(coverage::compute_week_coverage(
            &catalog,
            &branch_ids,
            assignments,
            schedule.week_start,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org_user() -> CurrentUser {
        CurrentUser { id: Uuid::new_v4(), scope: CallerScope::Organization }
    }

    fn branch_user(branch_id: Uuid) -> CurrentUser {
        CurrentUser { id: Uuid::new_v4(), scope: CallerScope::Branch(branch_id) }
    }

    #[test]
    fn escala_travada_nao_aceita_mutacao_nenhuma() {
        assert!(matches!(
            ensure_draft(ScheduleStatus::Locked),
            Err(AppError::ScheduleNotEditable)
        ));
        assert!(matches!(
            ensure_confirmable(ScheduleStatus::Locked),
            Err(AppError::ScheduleNotEditable)
        ));
    }

    #[test]
    fn publicada_bloqueia_edicao_mas_aceita_confirmacao() {
        assert!(matches!(
            ensure_draft(ScheduleStatus::Published),
            Err(AppError::ScheduleNotEditable)
        ));
        assert!(ensure_confirmable(ScheduleStatus::Published).is_ok());
    }

    #[test]
    fn transicoes_redundantes_tem_erro_proprio() {
        assert!(ensure_publishable(ScheduleStatus::Draft).is_ok());
        assert!(matches!(
            ensure_publishable(ScheduleStatus::Published),
            Err(AppError::AlreadyPublished)
        ));
        assert!(matches!(
            ensure_publishable(ScheduleStatus::Locked),
            Err(AppError::AlreadyLocked)
        ));
        assert!(matches!(
            ensure_lockable(ScheduleStatus::Locked),
            Err(AppError::AlreadyLocked)
        ));
        // rascunho pode ser travado direto (semana encerrada sem publicação)
        assert!(ensure_lockable(ScheduleStatus::Draft).is_ok());
    }

    #[test]
    fn publicacao_e_restrita_ao_escopo_da_organizacao() {
        assert!(ensure_org_scope(&org_user()).is_ok());
        assert!(matches!(
            ensure_org_scope(&branch_user(Uuid::new_v4())),
            Err(AppError::PermissionDenied)
        ));
    }

    #[test]
    fn gerente_de_unidade_so_edita_a_propria_unidade() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(ensure_branch_access(&branch_user(own), own).is_ok());
        assert!(matches!(
            ensure_branch_access(&branch_user(own), other),
            Err(AppError::PermissionDenied)
        ));
        assert!(ensure_branch_access(&org_user(), other).is_ok());
    }

    #[test]
    fn turno_que_a_unidade_nao_opera_rejeita_alocacao() {
        // Cenário: has_shift = false rejeita a escrita independente das
        // contagens mínima e máxima.
        let requirement = Requirement { min_staff: 3, max_staff: Some(5), has_shift: false };
        assert!(matches!(
            ensure_cell_admissible(&requirement, None, None),
            Err(AppError::ShiftNotOffered)
        ));
    }

    #[test]
    fn janela_de_um_lado_so_e_invalida() {
        let requirement = Requirement { min_staff: 1, max_staff: None, has_shift: true };
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let five = NaiveTime::from_hms_opt(17, 0, 0).unwrap();

        assert!(matches!(
            ensure_cell_admissible(&requirement, Some(nine), None),
            Err(AppError::InvalidWindow)
        ));
        assert!(matches!(
            ensure_cell_admissible(&requirement, None, Some(five)),
            Err(AppError::InvalidWindow)
        ));
        assert!(ensure_cell_admissible(&requirement, Some(nine), Some(five)).is_ok());
        assert!(ensure_cell_admissible(&requirement, None, None).is_ok());
    }

    #[test]
    fn janela_de_duracao_nula_e_invalida() {
        // início == fim viraria um turno de 24 horas na ancoragem da janela
        let requirement = Requirement { min_staff: 1, max_staff: None, has_shift: true };
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert!(matches!(
            ensure_cell_admissible(&requirement, Some(nine), Some(nine)),
            Err(AppError::InvalidWindow)
        ));
    }

    #[test]
    fn politica_default_bloqueia_celula_vazia() {
        let summary = CoverageSummary {
            empty_cells: 2,
            understaffed_cells: 1,
            satisfied_cells: 10,
            overstaffed_cells: 0,
            total_required_cells: 13,
        };
        assert!(matches!(
            check_publish_coverage(&PublishPolicy::default(), &summary),
            Err(AppError::InsufficientCoverage { empty_cells: 2 })
        ));
    }

    #[test]
    fn politica_permissiva_rebaixa_vazias_a_aviso() {
        let policy = PublishPolicy { block_on_empty: false };
        let summary = CoverageSummary {
            empty_cells: 2,
            understaffed_cells: 1,
            satisfied_cells: 10,
            overstaffed_cells: 0,
            total_required_cells: 13,
        };
        let warnings = check_publish_coverage(&policy, &summary).unwrap();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn cobertura_completa_publica_sem_avisos() {
        let summary = CoverageSummary {
            empty_cells: 0,
            understaffed_cells: 0,
            satisfied_cells: 14,
            overstaffed_cells: 0,
            total_required_cells: 14,
        };
        let warnings = check_publish_coverage(&PublishPolicy::default(), &summary).unwrap();
        assert!(warnings.is_empty());
    }
}
