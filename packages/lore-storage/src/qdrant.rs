use std::{cmp::Ordering, collections::HashMap};

use qdrant_client::{
	Qdrant,
	client::Payload,
	qdrant::{
		Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, PointId,
		PointStruct, Query, QueryPointsBuilder, ScrollPointsBuilder, UpsertPointsBuilder, Value,
		VectorParamsBuilder, value::Kind,
	},
};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;
use uuid::Uuid;

use lore_domain::{Chunk, ChunkMetadata};

use crate::{Error, Result};

const SCROLL_PAGE_SIZE: u32 = 256;

/// Qdrant collection holding one point per chunk.
///
/// Point ids are UUIDv5 values derived from the chunk id, so re-ingesting a
/// document overwrites its previous points instead of duplicating them.
pub struct ChunkStore {
	pub client: Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl ChunkStore {
	pub fn new(cfg: &lore_config::Qdrant) -> Result<Self> {
		let client = Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	pub async fn ensure_collection(&self, recreate: bool) -> Result<()> {
		let existing = self.client.list_collections().await?;
		let exists = existing.collections.iter().any(|c| c.name == self.collection);

		if exists && recreate {
			self.client.delete_collection(self.collection.clone()).await?;
		}
		if !exists || recreate {
			let vectors = VectorParamsBuilder::new(u64::from(self.vector_dim), Distance::Cosine);
			let create =
				CreateCollectionBuilder::new(self.collection.clone()).vectors_config(vectors);

			self.client.create_collection(create).await?;
		}

		Ok(())
	}

	pub async fn upsert_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<()> {
		if chunks.len() != embeddings.len() {
			return Err(Error::EmbeddingCount {
				chunks: chunks.len(),
				embeddings: embeddings.len(),
			});
		}

		let ingested_at = OffsetDateTime::now_utc().unix_timestamp();
		let mut points = Vec::with_capacity(chunks.len());

		for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
			let payload = Payload::from(payload_map(chunk, ingested_at));

			points.push(PointStruct::new(point_id_for(&chunk.id), embedding.clone(), payload));
		}

		let upsert = UpsertPointsBuilder::new(self.collection.clone(), points).wait(true);

		self.client.upsert_points(upsert).await?;

		Ok(())
	}

	/// Nearest-neighbor search over stored chunks.
	///
	/// A `category` filter is applied by Qdrant before the `limit` cut, so a
	/// scoped search still returns up to `limit` chunks.
	pub async fn search(
		&self,
		vector: Vec<f32>,
		limit: u64,
		category: Option<&str>,
	) -> Result<Vec<Chunk>> {
		let mut request = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.limit(limit)
			.with_payload(true);

		if let Some(category) = category {
			request = request
				.filter(Filter::must([Condition::matches("category", category.to_string())]));
		}

		let response = self.client.query(request).await?;

		Ok(response.result.iter().map(|point| chunk_from_payload(&point.payload)).collect())
	}

	/// Reads every stored chunk, ordered by category, document name, chunk
	/// index and id, so indexes built from the corpus rank ties the same way
	/// on every load.
	pub async fn fetch_corpus(&self) -> Result<Vec<Chunk>> {
		let mut chunks = Vec::new();
		let mut offset: Option<PointId> = None;

		loop {
			let mut request = ScrollPointsBuilder::new(self.collection.clone())
				.limit(SCROLL_PAGE_SIZE)
				.with_payload(true);

			if let Some(point_id) = offset.take() {
				request = request.offset(point_id);
			}

			let response = self.client.scroll(request).await?;

			chunks.extend(response.result.iter().map(|point| chunk_from_payload(&point.payload)));

			match response.next_page_offset {
				Some(next) => offset = Some(next),
				None => break,
			}
		}

		chunks.sort_by(corpus_order);

		Ok(chunks)
	}

	pub async fn count(&self) -> Result<u64> {
		let request = CountPointsBuilder::new(self.collection.clone()).exact(true);
		let response = self.client.count(request).await?;

		Ok(response.result.map(|result| result.count).unwrap_or_default())
	}
}

fn point_id_for(chunk_id: &str) -> String {
	Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes()).to_string()
}

fn payload_map(chunk: &Chunk, ingested_at: i64) -> HashMap<String, Value> {
	let mut payload = HashMap::new();

	payload.insert("chunk_id".to_string(), Value::from(chunk.id.clone()));
	payload.insert("text".to_string(), Value::from(chunk.text.clone()));
	payload.insert("category".to_string(), Value::from(chunk.metadata.category.clone()));
	payload.insert("document_name".to_string(), Value::from(chunk.metadata.document_name.clone()));
	payload.insert(
		"chunk_index".to_string(),
		chunk.metadata.chunk_index.map(Value::from).unwrap_or_else(|| Value::from(JsonValue::Null)),
	);
	payload.insert(
		"page_number".to_string(),
		chunk.metadata.page_number.map(Value::from).unwrap_or_else(|| Value::from(JsonValue::Null)),
	);
	payload.insert(
		"summary".to_string(),
		chunk
			.metadata
			.summary
			.as_ref()
			.map(|summary| Value::from(summary.clone()))
			.unwrap_or_else(|| Value::from(JsonValue::Null)),
	);
	payload.insert("ingested_at".to_string(), Value::from(ingested_at));

	payload
}

fn chunk_from_payload(payload: &HashMap<String, Value>) -> Chunk {
	Chunk {
		id: payload_str(payload, "chunk_id").unwrap_or_default(),
		text: payload_str(payload, "text").unwrap_or_default(),
		metadata: ChunkMetadata {
			category: payload_str(payload, "category").unwrap_or_default(),
			document_name: payload_str(payload, "document_name").unwrap_or_default(),
			chunk_index: payload_i64(payload, "chunk_index"),
			page_number: payload_i64(payload, "page_number"),
			summary: payload_str(payload, "summary"),
		},
	}
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	}
}

fn payload_i64(payload: &HashMap<String, Value>, key: &str) -> Option<i64> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::IntegerValue(value)) => Some(*value),
		Some(Kind::DoubleValue(value)) if value.fract() == 0.0 => Some(*value as i64),
		_ => None,
	}
}

fn corpus_order(a: &Chunk, b: &Chunk) -> Ordering {
	let key = |chunk: &Chunk| {
		(
			chunk.metadata.category.clone(),
			chunk.metadata.document_name.clone(),
			chunk.metadata.chunk_index,
			chunk.id.clone(),
		)
	};

	key(a).cmp(&key(b))
}
