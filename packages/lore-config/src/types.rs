use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub ingestion: Ingestion,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub chat: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Retrieval {
	#[serde(default = "default_top_k")]
	pub top_k: usize,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self { top_k: default_top_k() }
	}
}

#[derive(Debug, Deserialize)]
pub struct Ingestion {
	#[serde(default = "default_data_dir")]
	pub data_dir: PathBuf,
	#[serde(default = "default_max_chars")]
	pub max_chars: usize,
	#[serde(default = "default_overlap_chars")]
	pub overlap_chars: usize,
	#[serde(default = "default_embed_batch_size")]
	pub embed_batch_size: usize,
}
impl Default for Ingestion {
	fn default() -> Self {
		Self {
			data_dir: default_data_dir(),
			max_chars: default_max_chars(),
			overlap_chars: default_overlap_chars(),
			embed_batch_size: default_embed_batch_size(),
		}
	}
}

fn default_top_k() -> usize {
	6
}

fn default_data_dir() -> PathBuf {
	PathBuf::from("data")
}

fn default_max_chars() -> usize {
	900
}

fn default_overlap_chars() -> usize {
	150
}

fn default_embed_batch_size() -> usize {
	32
}
