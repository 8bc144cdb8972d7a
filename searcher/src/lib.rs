use boolsearch_core::tokenizer::lossy_lines;
use boolsearch_core::{QueryProcessor, Result};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub document: String,
    pub score: f64,
    /// `None` when the document could not be read back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<LineMatch>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineMatch {
    pub term: String,
    /// 1-based
    pub line: usize,
}

/// Run one query and attach the matching lines of every hit.
pub fn run_query(processor: &QueryProcessor, query: &str) -> Result<SearchResponse> {
    let start = std::time::Instant::now();
    let outcome = processor.search_query(query)?;

    let mut terms: Vec<&str> = Vec::new();
    for t in outcome.terms() {
        if !terms.contains(&t) {
            terms.push(t);
        }
    }

    let results = outcome
        .hits
        .iter()
        .map(|hit| {
            let matches = match matching_lines(Path::new(&hit.document_name), &terms) {
                Ok(m) => Some(m),
                Err(e) => {
                    tracing::error!(document = %hit.document_name, error = %e, "unable to open result document");
                    None
                }
            };
            SearchHit { document: hit.document_name.clone(), score: hit.score, matches }
        })
        .collect::<Vec<_>>();

    let elapsed = start.elapsed();
    Ok(SearchResponse { query: query.to_string(), took_s: elapsed.as_secs_f64(), total_hits: results.len(), results })
}

/// Every (term, line) pair where the line contains the term as a substring.
/// Undecodable bytes are replaced, so only a failed read is an error.
pub fn matching_lines(path: &Path, terms: &[&str]) -> io::Result<Vec<LineMatch>> {
    let bytes = fs::read(path)?;
    let mut out = Vec::new();
    for (i, line) in lossy_lines(&bytes).enumerate() {
        for term in terms {
            if line.contains(term) {
                out.push(LineMatch { term: term.to_string(), line: i + 1 });
            }
        }
    }
    Ok(out)
}

/// Plain-text report, one block per document.
pub fn render_text<W: Write>(resp: &SearchResponse, out: &mut W) -> io::Result<()> {
    if resp.results.is_empty() {
        writeln!(out, "No documents found")?;
        return Ok(());
    }
    for hit in &resp.results {
        writeln!(out, "File: {}", hit.document)?;
        writeln!(out, "BM25 Score: {}", hit.score)?;
        for m in hit.matches.iter().flatten() {
            writeln!(out, "term: {}, line {}", m.term, m.line)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_lines_in_latin1_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, b"caf\xe9 menu\nthe cat sat\n").unwrap();
        let matches = matching_lines(&path, &["cat", "menu"]).unwrap();
        assert_eq!(
            matches,
            vec![
                LineMatch { term: "menu".into(), line: 1 },
                LineMatch { term: "cat".into(), line: 2 },
            ]
        );
    }

    #[test]
    fn no_results_is_explicit() {
        let resp = SearchResponse { query: "x".into(), took_s: 0.0, total_hits: 0, results: vec![] };
        let mut buf = Vec::new();
        render_text(&resp, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "No documents found\n");
    }

    #[test]
    fn unreadable_document_prints_header_only() {
        let resp = SearchResponse {
            query: "cat".into(),
            took_s: 0.0,
            total_hits: 1,
            results: vec![SearchHit { document: "gone.txt".into(), score: 1.5, matches: None }],
        };
        let mut buf = Vec::new();
        render_text(&resp, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "File: gone.txt\nBM25 Score: 1.5\n\n");
    }
}
