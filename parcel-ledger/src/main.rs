//! Point d'entrée CLI pour parcel-ledger

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Charge `.env` (répertoire courant et parents, puis à côté du binaire)
fn load_env() {
    if dotenvy::dotenv().is_err() {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Registre des parcelles d'une exploitation
#[derive(Parser)]
#[command(name = "parcel-ledger")]
#[command(author, version)]
#[command(about = "Registre des parcelles cadastrales : lots, statuts d'acquisition et synthèse financière")]
#[command(long_about = "Ingestion de relevés cadastraux (reprojection WGS84, surface), numérotation des lots, suivi des acquisitions et synthèse des coûts.\n\nLe stockage est un fichier JSON (--store ou PARCEL_LEDGER_STORE).")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    load_env();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Ingest {
            input,
            store,
            config,
            crs,
            report,
        } => {
            debug!(input = %input.display(), "Commande ingest");
            cli::cmd_ingest(
                &input,
                store,
                config.as_deref(),
                crs.as_deref(),
                report.as_deref(),
            )?;
        }
        Commands::Summary { store, json } => cli::cmd_summary(store, json)?,
        Commands::List { store, status } => cli::cmd_list(store, status)?,
        Commands::Export {
            store,
            output,
            status,
            ids,
        } => {
            debug!(output = %output.display(), status = ?status, "Commande export");
            cli::cmd_export(store, &output, status, &ids)?;
        }
        Commands::Lot { parcel_ids, config } => cli::cmd_lot(&parcel_ids, config.as_deref())?,
        Commands::Set {
            store,
            id,
            status,
            cost,
            clear_cost,
            name,
        } => cli::cmd_set(store, &id, status, cost, clear_cost, name)?,
        Commands::Delete { store, id } => cli::cmd_delete(store, &id)?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
