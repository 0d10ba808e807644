//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Escalas: agregado semanal + ciclo de vida
    let schedule_routes = Router::new()
        .route(
            "/",
            post(handlers::scheduling::create_draft).get(handlers::scheduling::get_schedule_for_week),
        )
        .route("/{id}/coverage", get(handlers::scheduling::get_week_coverage))
        .route(
            "/{id}/assignments",
            post(handlers::scheduling::add_assignment)
                .get(handlers::scheduling::list_cell_assignments),
        )
        .route("/{id}/publish", post(handlers::scheduling::publish_schedule))
        .route("/{id}/lock", post(handlers::scheduling::lock_schedule))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Alocações endereçadas pelo próprio id
    let assignment_routes = Router::new()
        .route("/{id}", delete(handlers::scheduling::remove_assignment))
        .route("/{id}/confirm", post(handlers::scheduling::confirm_assignment))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let eligibility_routes = Router::new()
        .route("/", get(handlers::eligibility::eligible_for_cell))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let requirement_routes = Router::new()
        .route(
            "/{branchId}",
            get(handlers::requirements::list_requirements)
                .put(handlers::requirements::upsert_requirement),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/schedules", schedule_routes)
        .nest("/api/assignments", assignment_routes)
        .nest("/api/eligibility", eligibility_routes)
        .nest("/api/requirements", requirement_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
