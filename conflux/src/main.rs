// conflux/src/main.rs

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug conflux edit ... pour voir les réponses périmées écartées
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_dir = cli.project_dir;

    match cli.command {
        // --- USE CASE: EDIT ---
        Commands::Edit {
            form,
            script,
            record,
            submit,
        } => commands::edit::execute(project_dir, form.into(), script, record, submit).await,

        // --- USE CASE: RECONCILE ---
        Commands::Reconcile {
            record,
            write,
            format,
        } => commands::reconcile::execute(project_dir, record, write, format).await,

        // --- USE CASE: INSPECT ---
        Commands::Inspect {
            connection,
            schema,
            table,
        } => commands::inspect::execute(project_dir, connection, schema, table).await,

        // --- USE CASE: VALIDATE ---
        Commands::Validate { record } => commands::validate::execute(project_dir, record).await,
    }
}
