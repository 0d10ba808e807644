// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Taxonomia de erros do motor de escalas. Todos são locais e recuperáveis:
// nada aqui é engolido ou re-tentado — a camada de UI decide o que fazer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Ação restrita ao escopo da organização")]
    PermissionDenied,

    #[error("Escala não encontrada")]
    ScheduleNotFound,

    #[error("Alocação não encontrada")]
    AssignmentNotFound,

    #[error("Unidade não encontrada")]
    BranchNotFound,

    #[error("Funcionário não encontrado")]
    EmployeeNotFound,

    #[error("Já existe uma escala para essa semana")]
    ScheduleAlreadyExists,

    #[error("O funcionário já está alocado nessa célula")]
    DuplicateCell,

    #[error("Janela de horário inválida: informe início e fim, ou nenhum dos dois")]
    InvalidWindow,

    #[error("Essa unidade não opera esse turno")]
    ShiftNotOffered,

    #[error("A escala não está em rascunho e não pode ser editada")]
    ScheduleNotEditable,

    #[error("A escala já foi publicada")]
    AlreadyPublished,

    #[error("A escala já foi travada")]
    AlreadyLocked,

    #[error("A data {0} está fora da semana da escala")]
    DateOutsideScheduleWeek(chrono::NaiveDate),

    #[error("A unidade não pertence ao escopo desta escala")]
    BranchOutsideScope,

    #[error("Cobertura insuficiente: {empty_cells} célula(s) sem ninguém alocado")]
    InsufficientCoverage { empty_cells: i32 },

    // Falha de conectividade com o store: vira 500, propagada sem tratamento
    // especial (preocupação do colaborador, não deste núcleo).
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::InvalidToken | AppError::JwtError(_) => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::PermissionDenied => (StatusCode::FORBIDDEN, self.to_string()),

            AppError::ScheduleNotFound
            | AppError::AssignmentNotFound
            | AppError::BranchNotFound
            | AppError::EmployeeNotFound => (StatusCode::NOT_FOUND, self.to_string()),

            // Conflitos de estado: criação duplicada, célula duplicada e
            // transições redundantes ou fora de hora.
            AppError::ScheduleAlreadyExists
            | AppError::DuplicateCell
            | AppError::ScheduleNotEditable
            | AppError::AlreadyPublished
            | AppError::AlreadyLocked => (StatusCode::CONFLICT, self.to_string()),

            AppError::InvalidWindow
            | AppError::ShiftNotOffered
            | AppError::DateOutsideScheduleWeek(_)
            | AppError::BranchOutsideScope
            | AppError::InsufficientCoverage { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }

            // Todos os outros viram 500. O `tracing` loga o detalhe; o
            // cliente recebe uma mensagem genérica.
            e => {
                tracing::error!("Erro interno do servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
