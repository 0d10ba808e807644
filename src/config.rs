// src/config.rs

use crate::{
    db::{DirectoryRepository, RequirementRepository, ScheduleRepository},
    services::{
        CatalogService, EligibilityService, NotificationService, ScheduleService,
        schedule_service::PublishPolicy,
    },
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub schedule_service: ScheduleService,
    pub eligibility_service: EligibilityService,
    pub catalog_service: CatalogService,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, o main decide
    // não subir o servidor.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Política de publicação: bloquear célula vazia é o default
        // conservador; PUBLISH_BLOCK_ON_EMPTY=false rebaixa para aviso.
        let publish_policy = PublishPolicy {
            block_on_empty: env::var("PUBLISH_BLOCK_ON_EMPTY")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        };

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let schedule_repo = ScheduleRepository::new(db_pool.clone());
        let requirement_repo = RequirementRepository::new(db_pool.clone());
        let directory_repo = DirectoryRepository::new(db_pool.clone());

        let eligibility_service =
            EligibilityService::new(directory_repo.clone(), schedule_repo.clone());
        let catalog_service =
            CatalogService::new(requirement_repo.clone(), directory_repo.clone());
        let schedule_service = ScheduleService::new(
            db_pool.clone(),
            schedule_repo,
            requirement_repo,
            directory_repo,
            eligibility_service.clone(),
            NotificationService::new(),
            publish_policy,
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            schedule_service,
            eligibility_service,
            catalog_service,
        })
    }
}
