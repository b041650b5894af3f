use unicode_segmentation::UnicodeSegmentation;

#[derive(Clone, Debug)]
pub struct ChunkingConfig {
	pub max_chars: usize,
	pub overlap_chars: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
	pub chunk_index: i64,
	pub start_offset: usize,
	pub end_offset: usize,
	pub text: String,
}

/// Splits a document into pieces of at most `max_chars` characters, preferring
/// sentence boundaries and carrying a sentence-granular tail of up to
/// `overlap_chars` characters into the next piece. Offsets are byte offsets
/// into `text` and every piece is a verbatim slice of the source.
pub fn split_text(text: &str, cfg: &ChunkingConfig) -> Vec<Piece> {
	if text.trim().is_empty() {
		return Vec::new();
	}

	let mut pieces = Vec::new();
	let mut current = String::new();
	let mut current_start = 0_usize;
	let mut last_end = 0_usize;
	let mut chunk_index = 0_i64;

	for (idx, sentence) in text.split_sentence_bound_indices() {
		let sentence_chars = sentence.chars().count();

		if sentence_chars > cfg.max_chars {
			if !current.is_empty() {
				pieces.push(Piece {
					chunk_index,
					start_offset: current_start,
					end_offset: last_end,
					text: current.clone(),
				});

				chunk_index += 1;
				current.clear();
			}

			for (start, end) in hard_split(sentence, cfg) {
				pieces.push(Piece {
					chunk_index,
					start_offset: idx + start,
					end_offset: idx + end,
					text: sentence[start..end].to_string(),
				});

				chunk_index += 1;
			}

			last_end = idx + sentence.len();

			continue;
		}
		if current.chars().count() + sentence_chars > cfg.max_chars && !current.is_empty() {
			pieces.push(Piece {
				chunk_index,
				start_offset: current_start,
				end_offset: last_end,
				text: current.clone(),
			});

			chunk_index += 1;

			// The carried tail may not push the next piece past the budget.
			let budget = cfg.overlap_chars.min(cfg.max_chars - sentence_chars);
			let overlap = overlap_tail(&current, budget);

			current_start = last_end - overlap.len();
			current = overlap;
		}
		if current.is_empty() {
			current_start = idx;
		}

		current.push_str(sentence);

		last_end = idx + sentence.len();
	}

	if !current.trim().is_empty() {
		pieces.push(Piece {
			chunk_index,
			start_offset: current_start,
			end_offset: last_end,
			text: current,
		});
	}

	pieces
}

/// Byte ranges of `max_chars`-character windows over a sentence too long to
/// fit any piece, consecutive windows sharing `overlap_chars` characters.
fn hard_split(sentence: &str, cfg: &ChunkingConfig) -> Vec<(usize, usize)> {
	let mut bounds = sentence.char_indices().map(|(idx, _)| idx).collect::<Vec<_>>();

	bounds.push(sentence.len());

	let total_chars = bounds.len() - 1;
	let step = (cfg.max_chars - cfg.overlap_chars).max(1);
	let mut windows = Vec::new();
	let mut start_char = 0;

	while start_char < total_chars {
		let end_char = (start_char + cfg.max_chars).min(total_chars);

		windows.push((bounds[start_char], bounds[end_char]));

		if end_char == total_chars {
			break;
		}

		start_char += step;
	}

	windows
}

/// Longest suffix of whole sentences totalling at most `overlap_chars`
/// characters.
fn overlap_tail(text: &str, overlap_chars: usize) -> String {
	if overlap_chars == 0 {
		return String::new();
	}

	let sentences = text.split_sentence_bound_indices().collect::<Vec<_>>();
	let mut tail_start = text.len();
	let mut taken = 0_usize;

	for (idx, sentence) in sentences.into_iter().rev() {
		let count = sentence.chars().count();

		if taken + count > overlap_chars {
			break;
		}

		taken += count;
		tail_start = idx;
	}

	text[tail_start..].to_string()
}
