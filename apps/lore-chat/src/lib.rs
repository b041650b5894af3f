use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use lore_domain::{Category, Chunk, ChunkMetadata};
use lore_service::{AnswerResult, LoreService, ServiceError};
use lore_storage::qdrant::ChunkStore;

/// Reply shown when the router cannot place a question in any category.
const UNROUTED_ANSWER: &str = "I could not determine the domain of the question.";

#[derive(Debug, Parser)]
#[command(
	version = lore_cli::VERSION,
	rename_all = "kebab",
	styles = lore_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(value_name = "QUERY")]
	pub query: String,
	/// Search this category only instead of routing the query first.
	#[arg(long, value_name = "NAME")]
	pub category: Option<String>,
	/// How many chunks to retrieve.
	#[arg(long, value_name = "N")]
	pub top_k: Option<usize>,
	/// Print the retrieved chunks and skip the answer model.
	#[arg(long, conflicts_with = "route_only")]
	pub search_only: bool,
	/// Print the routed category and stop.
	#[arg(long)]
	pub route_only: bool,
	/// Emit the result as JSON.
	#[arg(long)]
	pub json: bool,
}

#[derive(Debug, Serialize)]
struct AskReport {
	query: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	category: Option<String>,
	answer: String,
	documents: Vec<ChunkMetadata>,
	context: String,
}

#[derive(Debug, Serialize)]
struct SearchReport {
	query: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	category: Option<String>,
	chunks: Vec<Chunk>,
}

#[derive(Debug, Serialize)]
struct RouteReport {
	query: String,
	category: String,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = lore_config::load(&args.config)?;

	init_tracing(&config);

	let category = args.category.as_deref().map(str::parse::<Category>).transpose()?;
	let store = ChunkStore::new(&config.storage.qdrant)?;
	let service = LoreService::new(config, store).await?;
	let k = args.top_k.unwrap_or(service.cfg.retrieval.top_k);

	if args.route_only {
		return route_only(&service, &args).await;
	}
	if args.search_only {
		return search_only(&service, &args, category, k).await;
	}

	ask(&service, &args, category, k).await
}

async fn route_only(service: &LoreService, args: &Args) -> color_eyre::Result<()> {
	let category = service.route(&args.query).await?;

	if args.json {
		let report = RouteReport {
			query: args.query.clone(),
			category: category.as_str().to_string(),
		};
		let json = serde_json::to_string_pretty(&report)?;

		println!("{json}");

		return Ok(());
	}

	println!("{}", category.as_str());

	Ok(())
}

async fn search_only(
	service: &LoreService,
	args: &Args,
	category: Option<Category>,
	k: usize,
) -> color_eyre::Result<()> {
	let scope = category.as_ref().map(Category::as_str);
	let chunks = service.retrieve(&args.query, scope, k).await?;

	if args.json {
		let report = SearchReport {
			query: args.query.clone(),
			category: scope.map(str::to_string),
			chunks,
		};
		let json = serde_json::to_string_pretty(&report)?;

		println!("{json}");

		return Ok(());
	}

	for (rank, chunk) in chunks.iter().enumerate() {
		println!("{:>2}. {}", rank + 1, chunk.id);
	}

	Ok(())
}

async fn ask(
	service: &LoreService,
	args: &Args,
	category: Option<Category>,
	k: usize,
) -> color_eyre::Result<()> {
	let category = match category {
		Some(category) => Some(category),
		None => match service.route(&args.query).await {
			Ok(category) => Some(category),
			Err(ServiceError::UnknownCategory { .. }) => {
				return emit_ask(args, None, unrouted_result());
			},
			Err(err) => return Err(err.into()),
		},
	};
	let scope = category.as_ref().map(Category::as_str);
	let result = service.answer(&args.query, scope, k).await?;

	emit_ask(args, scope.map(str::to_string), result)
}

fn emit_ask(args: &Args, category: Option<String>, result: AnswerResult) -> color_eyre::Result<()> {
	if args.json {
		let report = AskReport {
			query: args.query.clone(),
			category,
			answer: result.answer,
			documents: result.documents,
			context: result.context,
		};
		let json = serde_json::to_string_pretty(&report)?;

		println!("{json}");

		return Ok(());
	}

	println!("{}", result.answer);

	Ok(())
}

fn unrouted_result() -> AnswerResult {
	AnswerResult {
		answer: UNROUTED_ANSWER.to_string(),
		documents: Vec::new(),
		context: String::new(),
	}
}

fn init_tracing(config: &lore_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
