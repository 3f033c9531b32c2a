//! Fixed-size overlapping chunking of the knowledge text.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkOptions {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters of trailing context carried into the next chunk
    pub overlap: usize,
    pub separator: String,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
            separator: "\n\n".to_string(),
        }
    }
}

/// Split `text` on the separator and merge the pieces into chunks.
///
/// Pieces are trimmed and empty ones dropped. Chunks hold at most
/// `chunk_size` characters unless a single piece is already longer. When a
/// chunk is closed, its trailing pieces totalling at most `overlap`
/// characters start the next one.
pub fn chunk_text(text: &str, options: &ChunkOptions) -> Vec<String> {
    let sep = options.separator.as_str();
    let sep_len = sep.chars().count();
    let pieces = text
        .split(sep)
        .map(str::trim)
        .filter(|p| !p.is_empty());

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for piece in pieces {
        let piece_len = piece.chars().count();

        if !current.is_empty()
            && joined_len(&current, sep_len) + sep_len + piece_len > options.chunk_size
        {
            chunks.push(current.join(sep));

            // Keep the tail that fits in the overlap and still leaves room.
            while !current.is_empty()
                && (joined_len(&current, sep_len) > options.overlap
                    || joined_len(&current, sep_len) + sep_len + piece_len > options.chunk_size)
            {
                current.remove(0);
            }
        }

        current.push(piece);
    }

    if !current.is_empty() {
        chunks.push(current.join(sep));
    }

    chunks
}

fn joined_len(pieces: &[&str], sep_len: usize) -> usize {
    if pieces.is_empty() {
        return 0;
    }
    pieces.iter().map(|p| p.chars().count()).sum::<usize>() + sep_len * (pieces.len() - 1)
}
