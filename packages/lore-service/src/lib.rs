pub mod answer;
pub mod context;
pub mod retrieve;
pub mod route;

use std::{future::Future, pin::Pin, sync::Arc};

pub use answer::AnswerResult;
pub use context::build_context;
use lore_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use lore_domain::Chunk;
use lore_index::LexicalIndex;
use lore_providers::{chat, embedding};
use lore_storage::qdrant::ChunkStore;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, lore_providers::Result<Vec<Vec<f32>>>>;
}

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system: &'a str,
		user: &'a str,
	) -> BoxFuture<'a, lore_providers::Result<String>>;
}

/// Dense-vector side of hybrid retrieval.
///
/// The implementation must apply the category filter before the `limit` cut,
/// not on the truncated result.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		vector: Vec<f32>,
		limit: u64,
		category: Option<&'a str>,
	) -> BoxFuture<'a, ServiceResult<Vec<Chunk>>>;

	fn fetch_corpus<'a>(&'a self) -> BoxFuture<'a, ServiceResult<Vec<Chunk>>>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidArgument { message: String },
	EmptyCorpus,
	Embedding { message: String },
	VectorSearch { message: String },
	Chat { message: String },
	UnknownCategory { message: String },
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub chat: Arc<dyn ChatProvider>,
}

pub struct LoreService {
	pub cfg: Config,
	pub lexical: LexicalIndex,
	pub vectors: Arc<dyn VectorIndex>,
	pub providers: Providers,
}

/// Adapts a [`ChunkStore`] to the service's vector index seam.
pub struct QdrantIndex {
	pub store: ChunkStore,
}

struct DefaultProviders;

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidArgument { message } => write!(f, "Invalid argument: {message}"),
			Self::EmptyCorpus => {
				write!(f, "The document corpus is empty; run ingestion first.")
			},
			Self::Embedding { message } => write!(f, "Embedding provider error: {message}"),
			Self::VectorSearch { message } => write!(f, "Vector search error: {message}"),
			Self::Chat { message } => write!(f, "Chat provider error: {message}"),
			Self::UnknownCategory { message } => write!(f, "{message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<lore_index::Error> for ServiceError {
	fn from(err: lore_index::Error) -> Self {
		match err {
			lore_index::Error::EmptyCorpus => Self::EmptyCorpus,
		}
	}
}

impl From<lore_domain::UnknownCategory> for ServiceError {
	fn from(err: lore_domain::UnknownCategory) -> Self {
		Self::UnknownCategory { message: err.to_string() }
	}
}

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, lore_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl ChatProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system: &'a str,
		user: &'a str,
	) -> BoxFuture<'a, lore_providers::Result<String>> {
		Box::pin(chat::complete(cfg, system, user))
	}
}

impl VectorIndex for QdrantIndex {
	fn search<'a>(
		&'a self,
		vector: Vec<f32>,
		limit: u64,
		category: Option<&'a str>,
	) -> BoxFuture<'a, ServiceResult<Vec<Chunk>>> {
		Box::pin(async move {
			self.store
				.search(vector, limit, category)
				.await
				.map_err(|err| ServiceError::VectorSearch { message: err.to_string() })
		})
	}

	fn fetch_corpus<'a>(&'a self) -> BoxFuture<'a, ServiceResult<Vec<Chunk>>> {
		Box::pin(async move {
			self.store
				.fetch_corpus()
				.await
				.map_err(|err| ServiceError::VectorSearch { message: err.to_string() })
		})
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, chat: Arc<dyn ChatProvider>) -> Self {
		Self { embedding, chat }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);
		Self { embedding: provider.clone(), chat: provider }
	}
}

impl LoreService {
	/// Builds the service over a Qdrant-backed corpus with live providers.
	pub async fn new(cfg: Config, store: ChunkStore) -> ServiceResult<Self> {
		Self::with_providers(cfg, Arc::new(QdrantIndex { store }), Providers::default()).await
	}

	/// Reads the whole corpus once and builds the lexical index over it. An
	/// empty corpus is a startup failure, not a degraded mode.
	pub async fn with_providers(
		cfg: Config,
		vectors: Arc<dyn VectorIndex>,
		providers: Providers,
	) -> ServiceResult<Self> {
		let corpus = vectors.fetch_corpus().await?;
		let lexical = LexicalIndex::build(corpus)?;

		tracing::info!(chunks = lexical.len(), "Lexical index built.");

		Ok(Self { cfg, lexical, vectors, providers })
	}
}
