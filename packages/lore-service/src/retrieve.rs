use std::collections::HashSet;

use lore_domain::Chunk;

use crate::{LoreService, ServiceError, ServiceResult};

impl LoreService {
	/// Hybrid retrieval over the vector and lexical indexes.
	///
	/// The vector search is scoped by `category` inside the index; the
	/// lexical list is post-filtered here because that index has no filter
	/// of its own. Vector hits are fused ahead of lexical ones, deduplicated
	/// by chunk id on first occurrence, and cut to `k`.
	pub async fn retrieve(
		&self,
		query: &str,
		category: Option<&str>,
		k: usize,
	) -> ServiceResult<Vec<Chunk>> {
		if query.trim().is_empty() {
			return Err(ServiceError::InvalidArgument {
				message: "Query text must not be empty.".to_string(),
			});
		}
		if k == 0 {
			return Err(ServiceError::InvalidArgument {
				message: "Result count must be at least 1.".to_string(),
			});
		}

		let texts = [query.to_string()];
		let mut embeddings = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &texts)
			.await
			.map_err(|err| ServiceError::Embedding { message: err.to_string() })?;

		if embeddings.len() != 1 {
			return Err(ServiceError::Embedding {
				message: format!("Expected one query embedding, got {}.", embeddings.len()),
			});
		}

		let vector = embeddings.remove(0);
		let expected_dim = self.cfg.providers.embedding.dimensions as usize;

		if vector.len() != expected_dim {
			return Err(ServiceError::Embedding {
				message: format!(
					"Embedding dimension mismatch: expected {expected_dim}, got {}.",
					vector.len()
				),
			});
		}

		let vector_hits = self.vectors.search(vector, k as u64, category).await?;
		let mut lexical_hits = self.lexical.search(query, k);

		if let Some(category) = category {
			lexical_hits.retain(|chunk| chunk.metadata.category == category);
		}

		Ok(fuse(vector_hits, lexical_hits, k))
	}
}

/// Vector hits first, then lexical; the first occurrence of a chunk id wins.
/// Chunks without an id are dropped rather than treated as duplicates of one
/// another.
fn fuse(vector_hits: Vec<Chunk>, lexical_hits: Vec<Chunk>, k: usize) -> Vec<Chunk> {
	let mut seen = HashSet::new();
	let mut fused = Vec::new();

	for chunk in vector_hits.into_iter().chain(lexical_hits) {
		if chunk.id.is_empty() || !seen.insert(chunk.id.clone()) {
			continue;
		}

		fused.push(chunk);
	}

	fused.truncate(k);

	fused
}
