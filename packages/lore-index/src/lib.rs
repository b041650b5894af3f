use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

use lore_domain::Chunk;

pub type Result<T, E = Error> = std::result::Result<T, E>;

const K1: f32 = 1.2;
const B: f32 = 0.75;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot build a lexical index over an empty corpus.")]
	EmptyCorpus,
}

#[derive(Clone, Copy, Debug)]
struct Posting {
	ordinal: u32,
	term_count: u32,
}

/// BM25 index over the full chunk corpus, built once and read-only afterwards.
///
/// Ordinals follow the order of the corpus passed to [`LexicalIndex::build`];
/// score ties resolve to the earlier ordinal so repeated searches stay stable.
pub struct LexicalIndex {
	postings: HashMap<String, Vec<Posting>>,
	lengths: Vec<u32>,
	avg_length: f32,
	chunks: Vec<Chunk>,
}

impl LexicalIndex {
	pub fn build(chunks: Vec<Chunk>) -> Result<Self> {
		if chunks.is_empty() {
			return Err(Error::EmptyCorpus);
		}

		let mut postings = HashMap::<String, Vec<Posting>>::new();
		let mut lengths = Vec::with_capacity(chunks.len());

		for (ordinal, chunk) in chunks.iter().enumerate() {
			let mut counts = HashMap::<String, u32>::new();
			let mut length = 0_u32;

			for term in tokenize(&chunk.text) {
				*counts.entry(term).or_insert(0) += 1;
				length += 1;
			}

			lengths.push(length);

			for (term, term_count) in counts {
				postings
					.entry(term)
					.or_default()
					.push(Posting { ordinal: ordinal as u32, term_count });
			}
		}

		let avg_length = lengths.iter().sum::<u32>() as f32 / lengths.len() as f32;

		Ok(Self { postings, lengths, avg_length, chunks })
	}

	pub fn len(&self) -> usize {
		self.chunks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chunks.is_empty()
	}

	/// Top-k chunks by BM25 score. Only chunks containing at least one query
	/// term are candidates; an unmatched query yields an empty list.
	pub fn search(&self, query: &str, k: usize) -> Vec<Chunk> {
		if k == 0 {
			return Vec::new();
		}

		let n = self.chunks.len() as f32;
		let mut scores = HashMap::<u32, f32>::new();

		for term in tokenize(query) {
			let Some(postings) = self.postings.get(&term) else {
				continue;
			};
			let df = postings.len() as f32;
			let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

			for posting in postings {
				let tf = posting.term_count as f32;
				let length = self.lengths[posting.ordinal as usize] as f32;
				let score =
					idf * (tf * (K1 + 1.0)) / (tf + K1 * (1.0 - B + B * length / self.avg_length));

				*scores.entry(posting.ordinal).or_insert(0.0) += score;
			}
		}

		let mut ranked = scores.into_iter().collect::<Vec<_>>();

		ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
		ranked.truncate(k);

		ranked.into_iter().map(|(ordinal, _)| self.chunks[ordinal as usize].clone()).collect()
	}
}

fn tokenize(text: &str) -> impl Iterator<Item = String> {
	text.unicode_words().map(|word| word.to_lowercase())
}
