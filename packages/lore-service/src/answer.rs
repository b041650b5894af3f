use serde::Serialize;

use lore_domain::ChunkMetadata;

use crate::{LoreService, ServiceError, ServiceResult, context::build_context};

/// Fixed reply for a query that retrieves nothing; the model is not called.
pub const NO_DOCUMENTS_ANSWER: &str = "I could not find relevant information in the documents.";

const SYSTEM_PROMPT: &str =
	"You are an AI assistant answering questions strictly from internal documents.";

#[derive(Clone, Debug, Serialize)]
pub struct AnswerResult {
	pub answer: String,
	pub documents: Vec<ChunkMetadata>,
	pub context: String,
}

impl LoreService {
	/// Grounded question answering: retrieves, assembles the context block
	/// and asks the language model to answer from it alone.
	pub async fn answer(
		&self,
		query: &str,
		category: Option<&str>,
		k: usize,
	) -> ServiceResult<AnswerResult> {
		let chunks = self.retrieve(query, category, k).await?;

		if chunks.is_empty() {
			return Ok(AnswerResult {
				answer: NO_DOCUMENTS_ANSWER.to_string(),
				documents: Vec::new(),
				context: String::new(),
			});
		}

		let context = build_context(&chunks);
		let user = build_user_prompt(&context, query);
		let reply = self
			.providers
			.chat
			.complete(&self.cfg.providers.chat, SYSTEM_PROMPT, &user)
			.await
			.map_err(|err| ServiceError::Chat { message: err.to_string() })?;

		Ok(AnswerResult {
			answer: reply.trim().to_string(),
			documents: chunks.into_iter().map(|chunk| chunk.metadata).collect(),
			context,
		})
	}
}

fn build_user_prompt(context: &str, query: &str) -> String {
	format!(
		"Rules:\n- Use ONLY the provided context.\n- Do NOT use outside knowledge.\n- If the answer is not present, say:\n  \"I cannot find this information in the provided documents.\"\n\nContext:\n{context}\n\nQuestion:\n{query}\n\nAnswer clearly and concisely."
	)
}
