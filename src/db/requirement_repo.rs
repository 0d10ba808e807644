// src/db/requirement_repo.rs

use crate::{
    common::error::AppError,
    models::scheduling::{ShiftRequirement, ShiftType},
};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct RequirementRepository {
    pool: PgPool,
}

impl RequirementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_branch(&self, branch_id: Uuid) -> Result<Vec<ShiftRequirement>, AppError> {
        let rows = sqlx::query_as::<_, ShiftRequirement>(
            r#"
            SELECT id, branch_id, shift_type, weekday, min_staff, max_staff, has_shift
            FROM shift_requirements
            WHERE branch_id = $1
            ORDER BY shift_type, weekday NULLS FIRST
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_all(&self) -> Result<Vec<ShiftRequirement>, AppError> {
        let rows = sqlx::query_as::<_, ShiftRequirement>(
            r#"
            SELECT id, branch_id, shift_type, weekday, min_staff, max_staff, has_shift
            FROM shift_requirements
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Versão transacional de `list_for_branch`, para quando a resolução do
    /// requisito precisa enxergar o mesmo snapshot da escrita.
    pub async fn list_for_branch_with<'e, E>(
        &self,
        executor: E,
        branch_id: Uuid,
    ) -> Result<Vec<ShiftRequirement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ShiftRequirement>(
            r#"
            SELECT id, branch_id, shift_type, weekday, min_staff, max_staff, has_shift
            FROM shift_requirements
            WHERE branch_id = $1
            "#,
        )
        .bind(branch_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Upsert de uma linha do catálogo (superfície de configuração de
    /// unidade). O índice único usa COALESCE(weekday, -1), então o alvo do
    /// conflito precisa da mesma expressão.
    pub async fn upsert(
        &self,
        branch_id: Uuid,
        shift_type: ShiftType,
        weekday: Option<i16>,
        min_staff: i32,
        max_staff: Option<i32>,
        has_shift: bool,
    ) -> Result<ShiftRequirement, AppError> {
        let row = sqlx::query_as::<_, ShiftRequirement>(
            r#"
            INSERT INTO shift_requirements (branch_id, shift_type, weekday, min_staff, max_staff, has_shift)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (branch_id, shift_type, COALESCE(weekday, -1))
            DO UPDATE SET min_staff = EXCLUDED.min_staff,
                          max_staff = EXCLUDED.max_staff,
                          has_shift = EXCLUDED.has_shift
            RETURNING id, branch_id, shift_type, weekday, min_staff, max_staff, has_shift
            "#,
        )
        .bind(branch_id)
        .bind(shift_type)
        .bind(weekday)
        .bind(min_staff)
        .bind(max_staff)
        .bind(has_shift)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
