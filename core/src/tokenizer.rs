use std::borrow::Cow;
use std::collections::HashMap;

/// Split text into (term, position) on runs of whitespace.
///
/// Terms are kept byte-for-byte: no case folding, no punctuation stripping.
pub fn tokenize(text: &str) -> Vec<(&str, usize)> {
    text.split_whitespace().enumerate().map(|(pos, t)| (t, pos)).collect()
}

/// Count occurrences of every distinct term in `text`.
pub fn term_frequencies(text: &str) -> HashMap<&str, u32> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for (term, _pos) in tokenize(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// Lines of raw file bytes, split on `\n` only. Invalid UTF-8 becomes U+FFFD
/// instead of failing, so a Latin-1 file still yields its ASCII terms.
pub fn lossy_lines(bytes: &[u8]) -> impl Iterator<Item = Cow<'_, str>> {
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    // an empty file has no lines, "\n" has one empty line
    let skip = bytes.is_empty();
    body.split(|&b| b == b'\n')
        .filter(move |_| !skip)
        .map(String::from_utf8_lossy)
}
