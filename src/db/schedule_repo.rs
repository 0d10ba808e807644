// src/db/schedule_repo.rs

use crate::{
    common::error::AppError,
    models::scheduling::{Assignment, Schedule, ScheduleStatus, ShiftType},
};
use chrono::{NaiveDate, NaiveTime};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras (pool principal)
    // ---

    pub async fn get_for_week(
        &self,
        branch_scope: Option<Uuid>,
        week_start: NaiveDate,
    ) -> Result<Option<Schedule>, AppError> {
        let schedule = sqlx::query_as::<_, Schedule>(
            r#"
            SELECT * FROM schedules
            WHERE branch_scope IS NOT DISTINCT FROM $1 AND week_start = $2
            "#,
        )
        .bind(branch_scope)
        .bind(week_start)
        .fetch_optional(&self.pool)
        .await?;
        Ok(schedule)
    }

    pub async fn get_by_id(&self, schedule_id: Uuid) -> Result<Option<Schedule>, AppError> {
        let schedule = sqlx::query_as::<_, Schedule>("SELECT * FROM schedules WHERE id = $1")
            .bind(schedule_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(schedule)
    }

    pub async fn list_assignments(&self, schedule_id: Uuid) -> Result<Vec<Assignment>, AppError> {
        let assignments = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT * FROM assignments
            WHERE schedule_id = $1
            ORDER BY work_date, shift_type, branch_id, created_at
            "#,
        )
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    /// Alocações de um funcionário num intervalo de datas, em qualquer
    /// unidade. O intervalo inclui o dia anterior porque o turno da noite
    /// atravessa a meia-noite. Varredura consultiva: roda fora de transação
    /// e não segura lock nenhum.
    pub async fn assignments_for_employee_between(
        &self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Assignment>, AppError> {
        let assignments = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT * FROM assignments
            WHERE employee_id = $1 AND work_date BETWEEN $2 AND $3
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    /// Todas as alocações num intervalo de datas (todas as unidades), para a
    /// exclusão por sobreposição do resolvedor de elegibilidade.
    pub async fn assignments_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Assignment>, AppError> {
        let assignments = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE work_date BETWEEN $1 AND $2",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    // ---
    // Escritas (padrão Executor: rodam dentro da transação do service)
    // ---

    /// Busca a escala com lock de linha. Toda mutação passa por aqui antes de
    /// checar o status, para que dois editores concorrentes se serializem.
    pub async fn get_by_id_for_update<'e, E>(
        &self,
        executor: E,
        schedule_id: Uuid,
    ) -> Result<Option<Schedule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let schedule = sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE id = $1 FOR UPDATE",
        )
        .bind(schedule_id)
        .fetch_optional(executor)
        .await?;
        Ok(schedule)
    }

    pub async fn create_draft<'e, E>(
        &self,
        executor: E,
        branch_scope: Option<Uuid>,
        week_start: NaiveDate,
    ) -> Result<Schedule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Schedule>(
            r#"
            INSERT INTO schedules (branch_scope, week_start, status)
            VALUES ($1, $2, 'draft')
            RETURNING *
            "#,
        )
        .bind(branch_scope)
        .bind(week_start)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::ScheduleAlreadyExists;
                }
            }
            AppError::DatabaseError(e)
        })
    }

    pub async fn insert_assignment<'e, E>(
        &self,
        executor: E,
        schedule_id: Uuid,
        branch_id: Uuid,
        work_date: NaiveDate,
        shift_type: ShiftType,
        employee_id: Uuid,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    ) -> Result<Assignment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments
                (schedule_id, branch_id, work_date, shift_type, employee_id, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(schedule_id)
        .bind(branch_id)
        .bind(work_date)
        .bind(shift_type)
        .bind(employee_id)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // O perdedor de dois inserts concorrentes na mesma célula cai
            // aqui, nunca numa sobrescrita silenciosa.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateCell;
                }
            }
            AppError::DatabaseError(e)
        })
    }

    pub async fn get_assignment<'e, E>(
        &self,
        executor: E,
        assignment_id: Uuid,
    ) -> Result<Option<Assignment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE id = $1")
            .bind(assignment_id)
            .fetch_optional(executor)
            .await?;
        Ok(assignment)
    }

    pub async fn delete_assignment<'e, E>(
        &self,
        executor: E,
        assignment_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(assignment_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Confirmação é idempotente: o primeiro `confirmed_at` prevalece.
    pub async fn confirm_assignment<'e, E>(
        &self,
        executor: E,
        assignment_id: Uuid,
    ) -> Result<Assignment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET confirmed_at = COALESCE(confirmed_at, now())
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(assignment_id)
        .fetch_one(executor)
        .await?;
        Ok(assignment)
    }

    pub async fn list_assignments_with<'e, E>(
        &self,
        executor: E,
        schedule_id: Uuid,
    ) -> Result<Vec<Assignment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignments =
            sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE schedule_id = $1")
                .bind(schedule_id)
                .fetch_all(executor)
                .await?;
        Ok(assignments)
    }

    /// Avança o status. O service já validou a transição com a linha
    /// travada; aqui é só o UPDATE.
    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        schedule_id: Uuid,
        status: ScheduleStatus,
        set_published_at: bool,
    ) -> Result<Schedule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let schedule = sqlx::query_as::<_, Schedule>(
            r#"
            UPDATE schedules
            SET status = $2,
                published_at = CASE WHEN $3 THEN now() ELSE published_at END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(schedule_id)
        .bind(status)
        .bind(set_published_at)
        .fetch_one(executor)
        .await?;
        Ok(schedule)
    }
}
