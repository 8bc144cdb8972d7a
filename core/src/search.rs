//! BM25 scoring and boolean evaluation over bounded top-K score sets.

use crate::config::{CorpusSize, SearchConfig};
use crate::error::{Error, Result};
use crate::index::{InvertedIndex, Posting};
use crate::persist::load_index;
use crate::query::{self, Operator, Query, Token};
use crate::score::{BoundedScoreSet, ScoreEntry};
use std::path::Path;

/// Corpus statistics BM25 needs, computed once per index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusStats {
    /// `N` in the IDF term.
    pub corpus_size: f64,
    pub avg_length: f64,
}

impl CorpusStats {
    pub fn from_index(index: &InvertedIndex, corpus_size: CorpusSize) -> Self {
        let n = match corpus_size {
            CorpusSize::DistinctTerms => index.term_count(),
            CorpusSize::Documents => index.document_count(),
        };
        Self { corpus_size: n as f64, avg_length: index.average_posting_len() }
    }
}

/// BM25 weight of one posting, given the term's document frequency.
pub fn bm25(posting: &Posting, document_frequency: usize, stats: &CorpusStats, k1: f64, b: f64) -> f64 {
    let df = document_frequency as f64;
    let idf = ((stats.corpus_size - df + 0.5) / (df + 0.5)).ln();
    let tf = f64::from(posting.term_frequency);
    let dl = posting.document_length as f64;
    idf * (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * (dl / stats.avg_length)))
}

/// Ranked result of one query.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub query: Query,
    pub hits: Vec<ScoreEntry>,
}

impl SearchOutcome {
    pub fn terms(&self) -> Vec<&str> {
        self.query.terms().collect()
    }
}

/// Answers boolean queries against one loaded index.
pub struct QueryProcessor {
    index: InvertedIndex,
    config: SearchConfig,
    stats: CorpusStats,
}

impl QueryProcessor {
    pub fn new(index: InvertedIndex, config: SearchConfig) -> Self {
        let stats = CorpusStats::from_index(&index, config.corpus_size);
        tracing::debug!(?stats, max_documents = config.max_documents, "query processor ready");
        Self { index, config, stats }
    }

    /// Load an index file and build a processor over it.
    pub fn open<P: AsRef<Path>>(path: P, config: SearchConfig) -> Result<Self> {
        Ok(Self::new(load_index(path)?, config))
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn stats(&self) -> CorpusStats {
        self.stats
    }

    fn empty_set(&self) -> BoundedScoreSet {
        BoundedScoreSet::new(self.config.max_documents)
    }

    /// Parse, validate and evaluate `query`.
    pub fn search_query(&self, query: &str) -> Result<SearchOutcome> {
        let query = query::parse(query)?;
        let results = self.evaluate(&query)?;
        Ok(SearchOutcome { query, hits: results.into_sorted_vec() })
    }

    /// BM25 scores of every document containing `term`.
    pub fn search_term(&self, term: &str) -> BoundedScoreSet {
        let mut set = self.empty_set();
        let Some(postings) = self.index.postings(term) else {
            return set;
        };
        for posting in postings {
            let score = bm25(posting, postings.len(), &self.stats, self.config.k1, self.config.b);
            set.insert(score, &posting.document_name);
        }
        set
    }

    /// Documents present in both sets, scored by the sum of both scores.
    pub fn search_and_query(&self, left: &BoundedScoreSet, right: &BoundedScoreSet) -> BoundedScoreSet {
        let mut out = self.empty_set();
        for entry in left.iter() {
            if let Some(other) = right.score_of(&entry.document_name) {
                out.insert(entry.score + other, &entry.document_name);
            }
        }
        out
    }

    /// Documents present in either set, scored by the higher of their scores.
    pub fn search_or_query(&self, left: &BoundedScoreSet, right: &BoundedScoreSet) -> BoundedScoreSet {
        let mut out = self.empty_set();
        for entry in left.iter().chain(right.iter()) {
            out.insert(entry.score, &entry.document_name);
        }
        out
    }

    /// Evaluate a postfix query with an explicit stack of score sets.
    pub fn evaluate(&self, query: &Query) -> Result<BoundedScoreSet> {
        let mut stack: Vec<BoundedScoreSet> = Vec::new();
        for token in query.postfix() {
            match token {
                Token::Term(term) => stack.push(self.search_term(term)),
                Token::Operator(op) => {
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Err(Error::malformed(format!("{op} is missing an operand")));
                    };
                    let combined = match op {
                        Operator::And => self.search_and_query(&left, &right),
                        Operator::Or => self.search_or_query(&left, &right),
                    };
                    tracing::trace!(%op, left = left.len(), right = right.len(), out = combined.len(), "combined");
                    stack.push(combined);
                }
                Token::LeftParen | Token::RightParen => {
                    return Err(Error::malformed("parenthesis in postfix stream"));
                }
            }
        }
        let result = stack.pop().ok_or_else(|| Error::malformed("empty expression"))?;
        if !stack.is_empty() {
            return Err(Error::malformed(format!("{} operands left without an operator", stack.len())));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;
    use crate::ErrorKind;

    fn two_docs() -> QueryProcessor {
        let mut b = IndexBuilder::new();
        b.add_document("doc1", "the cat sat ");
        b.add_document("doc2", "the dog sat on the mat ");
        QueryProcessor::new(b.finish(), SearchConfig::default())
    }

    fn posting(tf: u32, len: u64) -> Posting {
        Posting { document_name: "d".into(), term_frequency: tf, document_length: len }
    }

    #[test]
    fn bm25_increases_with_term_frequency() {
        let stats = CorpusStats { corpus_size: 100.0, avg_length: 20.0 };
        let mut last = f64::NEG_INFINITY;
        for tf in 1..20 {
            let s = bm25(&posting(tf, 30), 3, &stats, 2.0, 0.75);
            assert!(s > last, "tf={tf}");
            last = s;
        }
    }

    #[test]
    fn bm25_matches_formula() {
        let stats = CorpusStats { corpus_size: 6.0, avg_length: 8.0 / 6.0 };
        let s = bm25(&posting(1, 12), 1, &stats, 2.0, 0.75);
        let idf = (5.5f64 / 1.5).ln();
        let expected = idf * 3.0 / (1.0 + 2.0 * (0.25 + 0.75 * 12.0 / (8.0 / 6.0)));
        assert!((s - expected).abs() < 1e-12);
    }

    #[test]
    fn corpus_size_options() {
        let qp = two_docs();
        assert_eq!(qp.stats().corpus_size, 6.0);
        let mut b = IndexBuilder::new();
        b.add_document("doc1", "the cat sat ");
        b.add_document("doc2", "the dog sat on the mat ");
        let cfg = SearchConfig { corpus_size: CorpusSize::Documents, ..SearchConfig::default() };
        let qp = QueryProcessor::new(b.finish(), cfg);
        assert_eq!(qp.stats().corpus_size, 2.0);
    }

    #[test]
    fn missing_term_is_empty() {
        assert!(two_docs().search_term("zebra").is_empty());
    }

    #[test]
    fn and_is_intersection_with_summed_scores() {
        let qp = two_docs();
        let the = qp.search_term("the");
        let sat = qp.search_term("sat");
        let both = qp.search_and_query(&the, &sat);
        assert_eq!(both.len(), 2);
        for e in both.iter() {
            let expected = the.score_of(&e.document_name).unwrap() + sat.score_of(&e.document_name).unwrap();
            assert!((e.score - expected).abs() < 1e-12);
        }
        let cat = qp.search_term("cat");
        let dog = qp.search_term("dog");
        assert!(qp.search_and_query(&cat, &dog).is_empty());
    }

    #[test]
    fn or_keeps_max_score() {
        let qp = QueryProcessor::new(InvertedIndex::new(), SearchConfig::default());
        let mut left = BoundedScoreSet::new(10);
        left.insert(1.0, "a");
        left.insert(5.0, "b");
        let mut right = BoundedScoreSet::new(10);
        right.insert(3.0, "a");
        right.insert(2.0, "c");
        let out = qp.search_or_query(&left, &right);
        assert_eq!(out.len(), 3);
        assert_eq!(out.score_of("a"), Some(3.0));
        assert_eq!(out.score_of("b"), Some(5.0));
        assert_eq!(out.score_of("c"), Some(2.0));
    }

    #[test]
    fn combined_sets_respect_capacity() {
        let cfg = SearchConfig::default().with_max_documents(2);
        let qp = QueryProcessor::new(InvertedIndex::new(), cfg);
        let mut left = BoundedScoreSet::new(10);
        let mut right = BoundedScoreSet::new(10);
        for (i, s) in [4.0, 1.0, 3.0, 2.0].iter().enumerate() {
            left.insert(*s, &format!("d{i}"));
            right.insert(*s, &format!("d{i}"));
        }
        let or = qp.search_or_query(&left, &right);
        assert_eq!(or.len(), 2);
        assert_eq!(or.into_sorted_vec().iter().map(|e| e.score).collect::<Vec<_>>(), vec![4.0, 3.0]);
        let and = qp.search_and_query(&left, &right);
        assert_eq!(and.into_sorted_vec().iter().map(|e| e.score).collect::<Vec<_>>(), vec![8.0, 6.0]);
    }

    #[test]
    fn end_to_end_queries() {
        let qp = two_docs();
        let cat = qp.search_query("cat").unwrap();
        assert_eq!(cat.hits.len(), 1);
        assert_eq!(cat.hits[0].document_name, "doc1");
        assert!(cat.hits[0].score > 0.0);

        let either = qp.search_query("cat OR dog").unwrap();
        let mut names: Vec<&str> = either.hits.iter().map(|h| h.document_name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["doc1", "doc2"]);

        assert!(qp.search_query("cat AND dog").unwrap().hits.is_empty());
        assert_eq!(qp.search_query("(cat OR dog) AND sat").unwrap().hits.len(), 2);
    }

    #[test]
    fn invalid_query_is_reported() {
        let err = two_docs().search_query("cat AND").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
    }

    #[test]
    fn unbalanced_postfix_is_malformed() {
        let qp = two_docs();
        let underflow = Query::from_postfix(vec![Token::Term("cat".into()), Token::Operator(Operator::And)]);
        assert_eq!(qp.evaluate(&underflow).unwrap_err().kind(), ErrorKind::MalformedExpression);
        let leftover = Query::from_postfix(vec![Token::Term("cat".into()), Token::Term("dog".into())]);
        assert_eq!(qp.evaluate(&leftover).unwrap_err().kind(), ErrorKind::MalformedExpression);
        let empty = Query::from_postfix(Vec::new());
        assert_eq!(qp.evaluate(&empty).unwrap_err().kind(), ErrorKind::MalformedExpression);
    }

    fn build_in_order(docs: &[(&str, &str)], order: &[usize], cfg: SearchConfig) -> QueryProcessor {
        let mut b = IndexBuilder::new();
        for &i in order {
            b.add_document(docs[i].0, docs[i].1);
        }
        QueryProcessor::new(b.finish(), cfg)
    }

    #[test]
    fn document_order_does_not_change_results() {
        let docs = [
            ("d1", "x a1"),
            ("d2", "x a2"),
            ("d3", "x a3"),
            ("d4", "y b1 b2"),
            ("d5", "y x b3 b4"),
            ("d6", "z c1 c2 c3"),
        ];
        let orders: [&[usize]; 3] = [&[0, 1, 2, 3, 4, 5], &[5, 4, 3, 2, 1, 0], &[2, 4, 0, 5, 1, 3]];
        for corpus_size in [CorpusSize::DistinctTerms, CorpusSize::Documents] {
            // capacity below the hit count, so ties decide what survives
            let cfg = SearchConfig { max_documents: 2, corpus_size, ..SearchConfig::default() };
            let runs: Vec<QueryProcessor> = orders.iter().map(|o| build_in_order(&docs, o, cfg.clone())).collect();
            for query in ["x", "x OR y", "x AND y", "(x OR z) AND y", "y OR z"] {
                let expected = runs[0].search_query(query).unwrap().hits;
                for qp in &runs[1..] {
                    assert_eq!(qp.search_query(query).unwrap().hits, expected, "{query} {corpus_size:?}");
                }
            }
        }

        let qp = build_in_order(&docs, &[5, 4, 3, 2, 1, 0], SearchConfig::default().with_max_documents(2));
        let hits = qp.search_query("x").unwrap().hits;
        // d1..d3 tie on score; the smaller names win the two slots
        assert_eq!(hits[0].score, hits[1].score);
        assert_eq!(hits.iter().map(|h| h.document_name.as_str()).collect::<Vec<_>>(), vec!["d1", "d2"]);
    }

    #[test]
    fn term_in_more_documents_than_terms_scores_nan() {
        // N = 1 distinct term, df = 3: the IDF argument is negative
        let mut b = IndexBuilder::new();
        for name in ["c", "a", "b"] {
            b.add_document(name, "t");
        }
        let qp = QueryProcessor::new(b.finish(), SearchConfig::default());
        let hits = qp.search_query("t").unwrap().hits;
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| h.score.is_nan()));
        assert_eq!(hits.iter().map(|h| h.document_name.as_str()).collect::<Vec<_>>(), vec!["a", "b", "c"]);

        let cfg = SearchConfig { corpus_size: CorpusSize::Documents, ..SearchConfig::default() };
        let mut b = IndexBuilder::new();
        b.add_document("a", "t");
        let qp = QueryProcessor::new(b.finish(), cfg);
        assert!(!qp.search_query("t").unwrap().hits[0].score.is_nan());
    }
}
