pub mod ingest;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
	version = lore_cli::VERSION,
	rename_all = "kebab",
	styles = lore_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Drop and recreate the collection before ingesting.
	#[arg(long)]
	pub recreate: bool,
	/// Ask the language model for a short summary of every chunk.
	#[arg(long)]
	pub summaries: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = lore_config::load(&args.config)?;

	init_tracing(&config);

	let store = lore_storage::qdrant::ChunkStore::new(&config.storage.qdrant)?;

	store.ensure_collection(args.recreate).await?;
	ingest::run_ingestion(&config, &store, args.summaries).await
}

fn init_tracing(config: &lore_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
