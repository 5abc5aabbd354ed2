use std::path::PathBuf;

use clap::{Parser, Subcommand};
use evc_db::{MigrationError, Migrator};
use sqlx::SqlitePool;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "evc-migrate",
    version,
    about = "Applies the EVC SQLite schema migrations."
)]
struct Cli {
    /// SQLite connection URL, e.g. sqlite://evc.db. Can also be set via DATABASE_URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Migrations directory (defaults to the crate's migrations/).
    #[arg(long)]
    migrations_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Applies all pending migrations.
    Up,

    /// Rolls back applied migrations (default: 1 step).
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },

    /// Prints migration status.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), MigrationError> {
    init_tracing();
    let cli = Cli::parse();
    let pool = connect_pool(&cli.database_url).await?;
    let migrator = match cli.migrations_dir {
        Some(dir) => Migrator::with_directory(pool.clone(), dir),
        None => Migrator::new(pool.clone()),
    };

    match cli.command {
        Command::Up => {
            info!("applying pending migrations");
            migrator.run_migrations().await?;
        }
        Command::Down { steps } => {
            info!(steps, "rolling back migrations");
            for _ in 0..steps {
                if migrator.rollback_last().await?.is_none() {
                    break;
                }
            }
        }
        Command::Status => {
            let status = migrator.status().await?;
            for entry in status {
                println!("{}", entry);
            }
        }
    }

    Ok(())
}

async fn connect_pool(database_url: &str) -> Result<SqlitePool, MigrationError> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

fn init_tracing() {
    let default_filter = "info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
