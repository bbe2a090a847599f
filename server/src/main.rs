mod config;
mod http;

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{DbPool, connect};
use platform_obs::{ObsConfig, init_tracing, shutdown_tracing};
use products_hr::{EmployeeDto, EmployeeService, HrError};
use tracing::info;

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "employees-server", version, about = "Employee records service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Insert demo employees.
    Seed,
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
    /// Rollback every migration, then apply them again.
    Reset,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, env = "SERVER_PORT", default_value_t = 8080)]
    port: u16,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

const DEMO_EMPLOYEES: &[(&str, &str, &str)] = &[
    ("Bilbo Baggins", "bilbo@shire.test", "burglar"),
    ("Frodo Baggins", "frodo@shire.test", "thief"),
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::from_env()?)?;
    let cli = Cli::parse();
    let config = Arc::new(AppConfig::load()?);
    let outcome = run(cli.command, config).await;
    shutdown_tracing();
    outcome
}

async fn run(command: Command, config: Arc<AppConfig>) -> Result<()> {
    match command {
        Command::Serve(cmd) => run_server(cmd, config).await,
        Command::Migrate(action) => {
            let pool = setup_pool(&config).await?;
            match action {
                MigrateCommand::Up => {
                    Migrator::up(&pool, None).await?;
                    info!("database migrations applied");
                }
                MigrateCommand::Down => {
                    Migrator::down(&pool, Some(1)).await?;
                    info!("most recent migration rolled back");
                }
                MigrateCommand::Reset => {
                    Migrator::reset(&pool).await?;
                    Migrator::up(&pool, None).await?;
                    info!("database reset");
                }
            }
            Ok(())
        }
        Command::Seed => run_seed(config).await,
    }
}

async fn setup_pool(config: &AppConfig) -> Result<DbPool> {
    connect(&config.database).await.map_err(Into::into)
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let pool = setup_pool(&config).await?;
    ensure_migrations(&pool, cmd.allow_dirty).await?;
    let state = AppState::new(pool, config);
    http::serve((&cmd).into(), state).await
}

async fn ensure_migrations(pool: &DbPool, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if !pending.is_empty() && !allow_dirty {
        anyhow::bail!(
            "pending migrations detected; run `employees-server migrate up` or pass --allow-dirty"
        );
    }
    Ok(())
}

async fn run_seed(config: Arc<AppConfig>) -> Result<()> {
    let pool = setup_pool(&config).await?;
    let state = AppState::new(pool, config);
    let inserted = seed_demo(&state.employees).await?;
    info!(inserted, "seed complete");
    Ok(())
}

/// Inserts the demo employees whose email is not taken yet.
async fn seed_demo(service: &EmployeeService) -> Result<usize> {
    let mut inserted = 0;
    for (name, email, role) in DEMO_EMPLOYEES {
        match service.find_by_email(email).await {
            Ok(_) => {
                info!(email, "demo employee already present");
                continue;
            }
            Err(HrError::EmailNotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }
        service
            .new_employee(EmployeeDto::new(*name, *email).with_role(*role))
            .await?;
        inserted += 1;
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use products_hr::{Routes, SeaOrmEmployeeRepository};
    use sea_orm::{ConnectionTrait, Database, DatabaseBackend, Statement};

    use super::*;

    #[tokio::test]
    async fn seeding_twice_inserts_once() {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        pool.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "CREATE TABLE employees (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, email TEXT NOT NULL, role TEXT);",
        ))
        .await
        .unwrap();
        let service = EmployeeService::with_hal(
            Arc::new(SeaOrmEmployeeRepository::new(pool)),
            Routes::default(),
        );

        assert_eq!(seed_demo(&service).await.unwrap(), 2);
        assert_eq!(seed_demo(&service).await.unwrap(), 0);

        let all = service.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.items[0].content.role.as_deref(), Some("burglar"));
    }

    #[test]
    fn cli_parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "employees-server",
            "serve",
            "--port",
            "9090",
            "--allow-dirty",
        ])
        .unwrap();
        match cli.command {
            Command::Serve(cmd) => {
                assert_eq!(cmd.port, 9090);
                assert!(cmd.allow_dirty);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
