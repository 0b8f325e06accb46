// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        ActivityRepository, ClientRepository, DashboardRepository, DealRepository,
        PipelineRepository, TaskRepository, UserRepository,
    },
    services::{
        activity_service::ActivityService, auth::AuthService, client_service::ClientService,
        dashboard_service::DashboardService, deal_service::DealService,
        pipeline_service::PipelineService, task_service::TaskService, user_service::UserService,
    },
};

const DEFAULT_TOKEN_MINUTES: i64 = 10080; // 7 dias
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CURRENCY: &str = "RUB";

/// Configuração imutável, montada uma única vez na inicialização.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub cors_origins: Vec<String>,
    pub bind_addr: String,
    pub database_max_connections: u32,
    pub default_currency: String,
}

impl Config {
    /// Lê o `.env` (se existir) e depois as variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado do `from_env` para os testes não mexerem no ambiente do processo.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let access_token_expire_minutes = match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .context("ACCESS_TOKEN_EXPIRE_MINUTES deve ser um número inteiro")?,
            None => DEFAULT_TOKEN_MINUTES,
        };
        if access_token_expire_minutes <= 0 {
            anyhow::bail!("ACCESS_TOKEN_EXPIRE_MINUTES deve ser positivo");
        }

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS deve ser um número inteiro")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            database_url,
            jwt_secret,
            access_token_expire_minutes,
            cors_origins,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_max_connections,
            default_currency: lookup("DEFAULT_CURRENCY")
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub client_service: ClientService,
    pub pipeline_service: PipelineService,
    pub deal_service: DealService,
    pub task_service: TaskService,
    pub activity_service: ActivityService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(config, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(config: Config, db_pool: PgPool) -> Self {
        let config = Arc::new(config);

        let user_repo = UserRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let pipeline_repo = PipelineRepository::new(db_pool.clone());
        let deal_repo = DealRepository::new(db_pool.clone());
        let task_repo = TaskRepository::new(db_pool.clone());
        let activity_repo = ActivityRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            config.jwt_secret.clone(),
            config.access_token_expire_minutes,
        );
        let user_service = UserService::new(user_repo.clone());
        let client_service = ClientService::new(client_repo.clone(), user_repo.clone());
        let pipeline_service = PipelineService::new(pipeline_repo.clone(), db_pool.clone());
        let deal_service = DealService::new(
            deal_repo.clone(),
            client_repo.clone(),
            pipeline_repo,
            activity_repo.clone(),
            user_repo.clone(),
            db_pool.clone(),
            config.default_currency.clone(),
        );
        let task_service =
            TaskService::new(task_repo, deal_repo.clone(), client_repo.clone(), user_repo);
        let activity_service = ActivityService::new(activity_repo, deal_repo, client_repo);
        let dashboard_service = DashboardService::new(dashboard_repo);

        Self {
            db_pool,
            config,
            auth_service,
            user_service,
            client_service,
            pipeline_service,
            deal_service,
            task_service,
            activity_service,
            dashboard_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/crm"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.access_token_expire_minutes, 10080);
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.default_currency, "RUB");
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000".to_string(), "http://127.0.0.1:3000".to_string()]
        );
    }

    #[test]
    fn requires_secret_and_database() {
        assert!(Config::from_lookup(lookup_from(&[("JWT_SECRET", "x")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).is_err());
    }

    #[test]
    fn parses_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/crm"),
            ("JWT_SECRET", "segredo"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "60"),
            ("CORS_ORIGINS", "https://crm.example.com, ,https://admin.example.com"),
            ("DEFAULT_CURRENCY", "BRL"),
        ]))
        .unwrap();

        assert_eq!(config.access_token_expire_minutes, 60);
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.default_currency, "BRL");
    }

    #[test]
    fn rejects_bad_token_lifetime() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/crm"),
            ("JWT_SECRET", "segredo"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "sete"),
        ]));
        assert!(result.is_err());
    }
}
