use crate::tokenizer::term_frequencies;
use std::collections::{HashMap, HashSet};

/// One document's entry in a term's posting list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub document_name: String,
    pub term_frequency: u32,
    /// Byte length of the whole document text, not its token count.
    pub document_length: u64,
}

/// Term to posting list. Built once, then read-only.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InvertedIndex {
    terms: HashMap<String, Vec<Posting>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.terms.get(term).map(Vec::as_slice)
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of distinct document names across all postings.
    pub fn document_count(&self) -> usize {
        self.terms
            .values()
            .flatten()
            .map(|p| p.document_name.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Mean posting-list length over all terms; 0 for an empty index.
    pub fn average_posting_len(&self) -> f64 {
        if self.terms.is_empty() {
            return 0.0;
        }
        let total: usize = self.terms.values().map(Vec::len).sum();
        total as f64 / self.terms.len() as f64
    }

    /// Terms in lexicographic byte order, for deterministic output.
    pub fn iter_sorted(&self) -> Vec<(&str, &[Posting])> {
        let mut entries: Vec<(&str, &[Posting])> =
            self.terms.iter().map(|(t, p)| (t.as_str(), p.as_slice())).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Append postings under `term`, creating the entry if needed.
    pub(crate) fn extend_term(&mut self, term: String, postings: impl IntoIterator<Item = Posting>) {
        self.terms.entry(term).or_default().extend(postings);
    }
}

/// Accumulates documents into an [`InvertedIndex`].
///
/// The builder owns the index exclusively while documents are added. Partial
/// builders (e.g. one per worker) can be combined with [`IndexBuilder::merge`]
/// as long as each document was added to only one of them.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: InvertedIndex,
    documents: usize,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize `text` and add one posting per distinct term.
    pub fn add_document(&mut self, document_name: &str, text: &str) {
        let document_length = text.len() as u64;
        for (term, tf) in term_frequencies(text) {
            self.index.extend_term(
                term.to_string(),
                [Posting { document_name: document_name.to_string(), term_frequency: tf, document_length }],
            );
        }
        self.documents += 1;
    }

    pub fn merge(&mut self, other: IndexBuilder) {
        for (term, postings) in other.index.terms {
            self.index.extend_term(term, postings);
        }
        self.documents += other.documents;
    }

    /// Documents added so far, including ones with no terms.
    pub fn documents_added(&self) -> usize {
        self.documents
    }

    pub fn finish(self) -> InvertedIndex {
        tracing::debug!(documents = self.documents, terms = self.index.term_count(), "index built");
        self.index
    }
}
