use lore_domain::Chunk;

/// Renders retrieved chunks into one prompt-ready block.
///
/// Each chunk becomes a source header followed by its text; blocks are
/// separated by a blank line and keep the input order. Pure; empty input
/// yields an empty string.
pub fn build_context(chunks: &[Chunk]) -> String {
	chunks
		.iter()
		.map(|chunk| {
			format!(
				"[Source: {} | Category: {}]\n{}",
				chunk.metadata.document_name, chunk.metadata.category, chunk.text
			)
		})
		.collect::<Vec<_>>()
		.join("\n\n")
}
