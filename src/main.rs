use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use medsuggest_lib::config::{self, ServerConfig};
use medsuggest_lib::{import, init_tracing, run};

#[derive(Parser)]
#[command(name = "medsuggest", version, about = "Medicine catalog suggestion service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve `GET /api/medicines/suggest` over HTTP.
    Serve(ServeArgs),
    /// Load the dataset CSV into the catalog database, replacing its rows.
    Import(ImportArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Catalog database path.
    #[arg(long, env = "MEDSUGGEST_DB")]
    db: Option<PathBuf>,
    /// Address to listen on.
    #[arg(long, env = "MEDSUGGEST_ADDR", default_value = config::DEFAULT_BIND_ADDR)]
    addr: SocketAddr,
    /// Distinct (query, limit) pairs kept in the score cache.
    #[arg(long, env = "MEDSUGGEST_CACHE_CAPACITY", default_value_t = config::SCORE_CACHE_CAPACITY)]
    cache_capacity: u64,
}

#[derive(Args)]
struct ImportArgs {
    /// Dataset CSV file.
    #[arg(long)]
    csv: PathBuf,
    /// Catalog database path.
    #[arg(long, env = "MEDSUGGEST_DB")]
    db: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Serve(args) => {
            let db_path = args.db.unwrap_or_else(config::default_database_path);
            let config = ServerConfig::new(db_path, args.addr).with_cache_capacity(args.cache_capacity);

            let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::error!("Failed to start async runtime: {e}");
                    return ExitCode::FAILURE;
                }
            };
            match runtime.block_on(run(config)) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!("{e}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Import(args) => {
            let db_path = args.db.unwrap_or_else(config::default_database_path);
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    tracing::error!(path = %parent.display(), "Cannot create catalog directory: {e}");
                    return ExitCode::FAILURE;
                }
            }
            match import::import_csv(&args.csv, &db_path) {
                Ok(summary) => {
                    println!(
                        "Imported {} medicines into {} ({} rows skipped)",
                        summary.imported,
                        db_path.display(),
                        summary.skipped
                    );
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!(csv = %args.csv.display(), "Import failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
