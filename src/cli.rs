// src/cli.rs

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "crm-backend")]
#[command(about = "API do CRM (servidor e tarefas administrativas)", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sobe o servidor HTTP (padrão)
    Serve,

    /// Cria um usuário administrador
    CreateAdmin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        full_name: String,

        /// Também pode vir de ADMIN_PASSWORD
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Cria o funil de vendas padrão com sete etapas
    InitPipeline {
        /// Cria mesmo que já exista algum funil
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}
