use std::{
	fs,
	path::{Path, PathBuf},
};

use color_eyre::{Result, eyre};
use tracing::{info, warn};

use lore_chunking::{ChunkingConfig, split_text};
use lore_config::Config;
use lore_domain::{Category, Chunk, ChunkMetadata, chunk_id};
use lore_providers::{chat, embedding};
use lore_storage::qdrant::ChunkStore;

const PAGE_BREAK: char = '\u{000C}';
const SUMMARY_SYSTEM_PROMPT: &str = "You summarize internal document excerpts.";

#[derive(Debug)]
pub struct SourceDocument {
	pub category: Category,
	pub document_name: String,
	pub pages: Vec<DocumentPage>,
}

#[derive(Debug)]
pub struct DocumentPage {
	pub number: Option<i64>,
	pub text: String,
}

pub async fn run_ingestion(cfg: &Config, store: &ChunkStore, summaries: bool) -> Result<()> {
	let documents = load_documents(&cfg.ingestion.data_dir)?;

	info!(documents = documents.len(), "Documents loaded.");

	let chunking = ChunkingConfig {
		max_chars: cfg.ingestion.max_chars,
		overlap_chars: cfg.ingestion.overlap_chars,
	};
	let mut chunks = Vec::new();

	for document in &documents {
		chunks.extend(chunk_document(document, &chunking));
	}

	info!(chunks = chunks.len(), "Chunks created.");

	if chunks.is_empty() {
		warn!("Nothing to ingest; queries against this collection will fail at startup.");

		return Ok(());
	}
	if summaries {
		attach_summaries(cfg, &mut chunks).await?;
	}

	embed_and_upsert(cfg, store, &chunks).await?;

	let total = store.count().await?;

	info!(total, "Ingestion complete.");

	Ok(())
}

/// Walks `data_dir` expecting one subdirectory per category, each holding
/// `.md` or `.txt` files. A subdirectory that is not a known category aborts
/// the run. Directories and files are visited in name order so repeated runs
/// see the corpus identically.
pub fn load_documents(data_dir: &Path) -> Result<Vec<SourceDocument>> {
	if !data_dir.is_dir() {
		return Err(eyre::eyre!("Data directory not found: {}.", data_dir.display()));
	}

	let mut category_dirs = Vec::new();

	for entry in fs::read_dir(data_dir)? {
		let entry = entry?;

		if entry.file_type()?.is_dir() {
			category_dirs.push(entry.path());
		}
	}

	category_dirs.sort();

	let mut documents = Vec::new();

	for dir in category_dirs {
		let name = dir
			.file_name()
			.and_then(|name| name.to_str())
			.ok_or_else(|| eyre::eyre!("Unreadable directory name under {}.", data_dir.display()))?;
		let category: Category = name.parse()?;

		for path in document_paths(&dir)? {
			let document_name = path
				.file_name()
				.and_then(|name| name.to_str())
				.ok_or_else(|| eyre::eyre!("Unreadable file name under {}.", dir.display()))?
				.to_string();
			let text = fs::read_to_string(&path)?;

			documents.push(SourceDocument { category, document_name, pages: split_pages(&text) });
		}
	}

	Ok(documents)
}

fn document_paths(dir: &Path) -> Result<Vec<PathBuf>> {
	let mut paths = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();
		let supported = path
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| matches!(ext, "md" | "txt"));

		if entry.file_type()?.is_file() && supported {
			paths.push(path);
		}
	}

	paths.sort();

	Ok(paths)
}

/// Form feeds mark page boundaries; pages are numbered from 1. A document
/// without any page break becomes a single unnumbered page.
pub fn split_pages(text: &str) -> Vec<DocumentPage> {
	if !text.contains(PAGE_BREAK) {
		return vec![DocumentPage { number: None, text: text.to_string() }];
	}

	text.split(PAGE_BREAK)
		.enumerate()
		.map(|(idx, page)| DocumentPage { number: Some(idx as i64 + 1), text: page.to_string() })
		.collect()
}

/// Chunk indexes run across the whole document, not per page, so chunk ids
/// stay unique within a document.
pub fn chunk_document(document: &SourceDocument, chunking: &ChunkingConfig) -> Vec<Chunk> {
	let category = document.category.as_str();
	let mut chunks = Vec::new();
	let mut index = 0_i64;

	for page in &document.pages {
		for piece in split_text(&page.text, chunking) {
			chunks.push(Chunk {
				id: chunk_id(category, &document.document_name, index),
				text: piece.text,
				metadata: ChunkMetadata {
					category: category.to_string(),
					document_name: document.document_name.clone(),
					chunk_index: Some(index),
					page_number: page.number,
					summary: None,
				},
			});

			index += 1;
		}
	}

	chunks
}

async fn attach_summaries(cfg: &Config, chunks: &mut [Chunk]) -> Result<()> {
	for chunk in chunks.iter_mut() {
		let user = format!(
			"Summarize the following passage in at most two sentences.\n\nPassage:\n{}",
			chunk.text
		);
		let summary = chat::complete(&cfg.providers.chat, SUMMARY_SYSTEM_PROMPT, &user).await?;

		chunk.metadata.summary = Some(summary.trim().to_string());
	}

	info!(chunks = chunks.len(), "Summaries attached.");

	Ok(())
}

async fn embed_and_upsert(cfg: &Config, store: &ChunkStore, chunks: &[Chunk]) -> Result<()> {
	for batch in chunks.chunks(cfg.ingestion.embed_batch_size) {
		let texts = batch.iter().map(|chunk| chunk.text.clone()).collect::<Vec<_>>();
		let vectors = embedding::embed(&cfg.providers.embedding, &texts).await?;

		store.upsert_chunks(batch, &vectors).await?;
	}

	Ok(())
}
