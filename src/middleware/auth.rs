// src/middleware/auth.rs
//
// Contexto de identidade/permissão: os tokens são emitidos pelo serviço de
// identidade (colaborador externo); aqui só validamos a assinatura e
// extraímos o escopo do chamador (unidade única vs. organização inteira).

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{CallerScope, Claims, CurrentUser},
};

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();
    let auth_header = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let token_data = decode::<Claims>(
                token,
                &DecodingKey::from_secret(app_state.jwt_secret.as_bytes()),
                &Validation::default(),
            )?;

            let claims = token_data.claims;
            let user = CurrentUser {
                id: claims.sub,
                scope: match claims.branch_id {
                    Some(branch_id) => CallerScope::Branch(branch_id),
                    None => CallerScope::Organization,
                },
            };

            // Insere o usuário nos "extensions" da requisição
            request.extensions_mut().insert(user);
            return Ok(next.run(request).await);
        }
    }

    Err(AppError::InvalidToken)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}
