//! Static breed knowledge used as context for explanations.
//!
//! The knowledge text is split into overlapping chunks once at startup and
//! indexed with a keyword index; explanation requests pull the top chunks
//! for a query built from the predicted breed.

pub mod chunker;
pub mod index;
pub mod pack;

pub use chunker::{chunk_text, ChunkOptions};
pub use index::{tokenize, ChunkHit, KnowledgeIndex};
pub use pack::{load_knowledge, DEFAULT_KNOWLEDGE};
