use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ChunkMetadata {
	pub category: String,
	pub document_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chunk_index: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub page_number: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub summary: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Chunk {
	pub id: String,
	pub text: String,
	pub metadata: ChunkMetadata,
}

pub fn chunk_id(category: &str, document_name: &str, chunk_index: i64) -> String {
	format!("{category}__{document_name}__chunk_{chunk_index}")
}
