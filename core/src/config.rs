//! Scoring constants and the runtime search configuration.
//!
//! Defaults reproduce the reference ranking. A JSON file can override any
//! subset of [`SearchConfig`]; the searcher binary layers its flags on top.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// BM25 term frequency saturation.
pub const BM25_K1: f64 = 2.0;

/// BM25 document length normalization.
pub const BM25_B: f64 = 0.75;

/// Result cap used when a query processor is built without an explicit one.
pub const DEFAULT_MAX_DOCUMENTS: usize = 10;

/// Result cap the command-line searcher uses.
pub const CLI_MAX_DOCUMENTS: usize = 100;

/// What BM25 uses as `N`, the corpus size, in the IDF term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusSize {
    /// Number of distinct indexed terms. Matches the reference ranking.
    ///
    /// When a term's document frequency exceeds `N + 0.5` the IDF logarithm
    /// is taken of a negative number and the score is NaN. NaN compares
    /// above every real score in a [`crate::BoundedScoreSet`], ties among
    /// NaN scores still break by document name.
    #[default]
    DistinctTerms,
    /// Number of distinct documents (textbook BM25).
    Documents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_documents: usize,
    pub k1: f64,
    pub b: f64,
    pub corpus_size: CorpusSize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_documents: DEFAULT_MAX_DOCUMENTS,
            k1: BM25_K1,
            b: BM25_B,
            corpus_size: CorpusSize::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = max_documents;
        self
    }

    /// Read a config from a JSON file. Missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::default().load_over(path)
    }

    /// Apply the fields present in a JSON file on top of `self`.
    pub fn load_over<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let buf = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let file: ConfigFile =
            serde_json::from_str(&buf).map_err(|source| Error::Config { path: path.to_path_buf(), source })?;
        Ok(file.apply(self))
    }
}

/// On-disk form of [`SearchConfig`]: every field optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    max_documents: Option<usize>,
    k1: Option<f64>,
    b: Option<f64>,
    corpus_size: Option<CorpusSize>,
}

impl ConfigFile {
    fn apply(self, base: SearchConfig) -> SearchConfig {
        SearchConfig {
            max_documents: self.max_documents.unwrap_or(base.max_documents),
            k1: self.k1.unwrap_or(base.k1),
            b: self.b.unwrap_or(base.b),
            corpus_size: self.corpus_size.unwrap_or(base.corpus_size),
        }
    }
}
