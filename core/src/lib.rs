//! Compressed on-disk inverted index with BM25-ranked boolean search.
//!
//! Build path: [`IndexBuilder`] -> [`codec::encode`] -> [`lzw::compress`] -> file.
//! Query path: file -> [`lzw::decompress`] -> [`codec::decode`] -> [`QueryProcessor`].

pub mod codec;
pub mod config;
pub mod error;
pub mod index;
pub mod lzw;
pub mod persist;
pub mod query;
pub mod score;
pub mod search;
pub mod tokenizer;

pub use config::{CorpusSize, SearchConfig};
pub use error::{Error, ErrorKind, Result};
pub use index::{IndexBuilder, InvertedIndex, Posting};
pub use score::{BoundedScoreSet, ScoreEntry};
pub use search::{QueryProcessor, SearchOutcome};
