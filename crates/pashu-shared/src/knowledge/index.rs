//! Keyword index over knowledge chunks.
//!
//! Inverted index with BM25-lite scoring. Deterministic: equal scores are
//! ordered by chunk position, so the same query always yields the same
//! context window.

use std::collections::HashMap;

const K1: f32 = 1.2;
const B: f32 = 0.75;

/// Tokenize text into lowercase alphanumeric terms of two or more chars.
///
/// `_` and `-` split terms so labels like `Red_Sindhi` match "red sindhi".
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.chars().count() >= 2)
        .map(String::from)
        .collect()
}

/// A chunk matching a query
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkHit<'a> {
    /// Position of the chunk in the knowledge base
    pub chunk: usize,
    /// Relevance score, scaled by 1000 (higher = better)
    pub score: i32,
    pub text: &'a str,
}

#[derive(Debug, Clone, Default)]
struct Posting {
    chunk: usize,
    term_freq: u32,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeIndex {
    chunks: Vec<String>,
    postings: HashMap<String, Vec<Posting>>,
    chunk_lengths: Vec<u32>,
    avg_chunk_length: f32,
}

impl KnowledgeIndex {
    pub fn new(chunks: Vec<String>) -> Self {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut chunk_lengths = Vec::with_capacity(chunks.len());

        for (chunk, text) in chunks.iter().enumerate() {
            let tokens = tokenize(text);
            chunk_lengths.push(tokens.len() as u32);

            let mut term_counts: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *term_counts.entry(token).or_insert(0) += 1;
            }
            for (token, term_freq) in term_counts {
                postings
                    .entry(token)
                    .or_default()
                    .push(Posting { chunk, term_freq });
            }
        }

        let total: u32 = chunk_lengths.iter().sum();
        let avg_chunk_length = if chunk_lengths.is_empty() {
            0.0
        } else {
            total as f32 / chunk_lengths.len() as f32
        };

        Self {
            chunks,
            postings,
            chunk_lengths,
            avg_chunk_length,
        }
    }

    /// Score chunks against the query, best first, at most `limit` hits.
    ///
    /// Chunks sharing no term with the query are never returned.
    pub fn search(&self, query: &str, limit: usize) -> Vec<ChunkHit<'_>> {
        let mut query_tokens = tokenize(query);
        query_tokens.sort();
        query_tokens.dedup();
        if query_tokens.is_empty() || limit == 0 {
            return vec![];
        }

        let n_chunks = self.chunks.len() as f32;
        let mut scores: HashMap<usize, f32> = HashMap::new();

        for token in &query_tokens {
            let Some(list) = self.postings.get(token) else {
                continue;
            };

            // IDF: ln((N - n + 0.5) / (n + 0.5) + 1)
            let n = list.len() as f32;
            let idf = ((n_chunks - n + 0.5) / (n + 0.5) + 1.0).ln();

            for posting in list {
                let len = self.chunk_lengths[posting.chunk] as f32;
                let norm = 1.0 - B + B * (len / self.avg_chunk_length.max(1.0));
                let tf = posting.term_freq as f32;
                let tf_score = (tf * (K1 + 1.0)) / (tf + K1 * norm);

                *scores.entry(posting.chunk).or_insert(0.0) += idf * tf_score;
            }
        }

        let mut results: Vec<(usize, i32)> = scores
            .into_iter()
            .map(|(chunk, score)| (chunk, (score * 1000.0) as i32))
            .collect();

        // Score desc, then chunk position asc
        results.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        results.truncate(limit);

        results
            .into_iter()
            .map(|(chunk, score)| ChunkHit {
                chunk,
                score,
                text: &self.chunks[chunk],
            })
            .collect()
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
