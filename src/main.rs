use std::{fs::File, io, path::PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trust_ledger::{
    Ledger, config::Config, dlq::TracingDLQ, engine::Engine, ingestion::CsvReader, output,
    snapshot,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file of actions to replay
    actions: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ledger snapshot to restore from and save to
    #[arg(short, long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Do not write the snapshot back on exit
    #[arg(long)]
    no_save: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .apply_env();
    if args.snapshot.is_some() {
        config.snapshot_path = args.snapshot.clone();
    }
    if args.no_save {
        config.save_snapshot = false;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let ledger = match &config.snapshot_path {
        Some(path) if path.exists() => snapshot::load(path)?,
        _ => Ledger::new(),
    };

    info!(actions = %args.actions.display(), "replaying actions");
    let ingestion = CsvReader::new(File::open(&args.actions)?);
    let mut engine = Engine::new(ingestion, ledger, TracingDLQ::default());
    engine.process().await?;
    let ledger = engine.into_ledger();

    output::write_summary(&ledger, io::stdout().lock())?;

    if let (Some(path), true) = (&config.snapshot_path, config.save_snapshot) {
        snapshot::save(&ledger, path)?;
    }

    Ok(())
}
