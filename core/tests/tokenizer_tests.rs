use boolsearch_core::tokenizer::{term_frequencies, tokenize};

#[test]
fn it_keeps_terms_byte_for_byte() {
    let toks = tokenize("Running, runner's RUN! The café's menu.");
    let words: Vec<&str> = toks.into_iter().map(|(w, _)| w).collect();
    // No case folding, no punctuation stripping
    assert_eq!(words, vec!["Running,", "runner's", "RUN!", "The", "café's", "menu."]);
}

#[test]
fn it_counts_per_document_frequencies() {
    let tf = term_frequencies("a b a\nc a b");
    assert_eq!(tf["a"], 3);
    assert_eq!(tf["b"], 2);
    assert_eq!(tf["c"], 1);
}

#[test]
fn it_yields_nothing_for_blank_text() {
    assert!(tokenize(" \t\r\n").is_empty());
    assert!(term_frequencies("").is_empty());
}
