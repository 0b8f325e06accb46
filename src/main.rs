//src/main.rs

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod cli;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

use crate::{
    cli::{Cli, Command},
    config::{AppState, Config},
    models::auth::{CreateUserPayload, Role},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: nível via RUST_LOG (padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    match cli.command() {
        Command::Serve => serve(app_state).await,
        Command::CreateAdmin { email, username, full_name, password } => {
            let payload = CreateUserPayload {
                email: email.clone(),
                username: username.clone(),
                full_name: full_name.clone(),
                password: password.clone(),
                role: Role::Admin,
                phone: None,
                position: None,
            };
            validator::Validate::validate(&payload)?;

            let admin = app_state.user_service.register(&payload).await?;
            tracing::info!("✅ Administrador '{}' criado (ID: {})", admin.username, admin.id);
            Ok(())
        }
        Command::InitPipeline { force } => {
            match app_state.pipeline_service.seed_default(*force).await? {
                Some(detail) => {
                    for stage in &detail.stages {
                        tracing::info!(
                            "   • {} ({}%){}",
                            stage.name,
                            stage.win_probability,
                            if stage.is_final { " [final]" } else { "" }
                        );
                    }
                }
                None => tracing::info!("Nada a fazer."),
            }
            Ok(())
        }
    }
}

async fn serve(app_state: AppState) -> anyhow::Result<()> {
    let addr = app_state.config.bind_addr.clone();
    let app = routes::build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
