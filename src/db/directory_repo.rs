// src/db/directory_repo.rs
//
// Leitura do diretório de pessoal (unidades, funcionários e cessões entre
// unidades). As escritas pertencem aos módulos de cadastro; o motor de
// escalas só consulta.

use crate::{
    common::error::AppError,
    models::directory::{Branch, CrossBranchAssignment, Employee},
};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_branch(&self, branch_id: Uuid) -> Result<Option<Branch>, AppError> {
        let branch = sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = $1")
            .bind(branch_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(branch)
    }

    pub async fn list_branches(&self) -> Result<Vec<Branch>, AppError> {
        let branches = sqlx::query_as::<_, Branch>("SELECT * FROM branches ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(branches)
    }

    pub async fn get_employee(&self, employee_id: Uuid) -> Result<Option<Employee>, AppError> {
        let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    pub async fn list_active_employees(&self) -> Result<Vec<Employee>, AppError> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE is_active = TRUE ORDER BY display_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    /// Cessões registradas para a unidade; quem decide se cobrem uma data é
    /// `CrossBranchAssignment::covers`.
    pub async fn grants_for_branch(
        &self,
        branch_id: Uuid,
    ) -> Result<Vec<CrossBranchAssignment>, AppError> {
        let grants = sqlx::query_as::<_, CrossBranchAssignment>(
            r#"
            SELECT id, employee_id, home_branch_id, branch_id, start_date, end_date
            FROM cross_branch_assignments
            WHERE branch_id = $1
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(grants)
    }
}
