//! Flat binary record format for an [`InvertedIndex`].
//!
//! Records follow each other with no header, delimiter or end marker. Terms
//! are written in lexicographic order. All integers are little-endian:
//!
//! ```text
//! term_len: u64 | term bytes
//! posting_count: u64
//!   posting_count x ( doc_length: u64 | name_len: u64 | name bytes | term_frequency: i32 )
//! ```
//!
//! `doc_length` is the only stored copy of a posting's document length.

use crate::error::{Error, Result};
use crate::index::{InvertedIndex, Posting};

/// Fails only if a term frequency exceeds `i32::MAX`.
pub fn encode(index: &InvertedIndex) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for (term, postings) in index.iter_sorted() {
        put_bytes(&mut out, term.as_bytes());
        out.extend_from_slice(&(postings.len() as u64).to_le_bytes());
        for p in postings {
            out.extend_from_slice(&p.document_length.to_le_bytes());
            put_bytes(&mut out, p.document_name.as_bytes());
            let tf = i32::try_from(p.term_frequency).map_err(|_| Error::ValueOutOfRange {
                field: "term frequency",
                value: u64::from(p.term_frequency),
            })?;
            out.extend_from_slice(&tf.to_le_bytes());
        }
    }
    Ok(out)
}

/// Decode a whole buffer. A record cut short anywhere is `TruncatedInput`.
pub fn decode(bytes: &[u8]) -> Result<InvertedIndex> {
    let mut reader = Reader { buf: bytes, offset: 0 };
    let mut index = InvertedIndex::new();
    while !reader.is_empty() {
        let term = reader.read_string("term")?;
        let count = reader.read_u64("posting count")?;
        // Each posting takes at least 20 bytes; reject absurd counts before allocating.
        let mut postings = Vec::with_capacity(count.min((reader.remaining() / 20) as u64) as usize);
        for _ in 0..count {
            let document_length = reader.read_u64("document length")?;
            let document_name = reader.read_string("document name")?;
            let at = reader.offset;
            let tf = reader.read_i32("term frequency")?;
            let term_frequency = u32::try_from(tf)
                .map_err(|_| Error::corrupt(format!("negative term frequency {tf} at offset {at}")))?;
            postings.push(Posting { document_name, term_frequency, document_length });
        }
        index.extend_term(term, postings);
    }
    Ok(index)
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    out.extend_from_slice(bytes);
}

struct Reader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn is_empty(&self) -> bool {
        self.offset >= self.buf.len()
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    fn take(&mut self, field: &'static str, len: u64) -> Result<&'a [u8]> {
        let available = self.remaining();
        let truncated = || Error::TruncatedInput { field, offset: self.offset, needed: len, available };
        let n = usize::try_from(len).map_err(|_| truncated())?;
        if n > available {
            return Err(truncated());
        }
        let buf = self.buf;
        let slice = &buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.take(field, N as u64)?);
        Ok(arr)
    }

    fn read_u64(&mut self, field: &'static str) -> Result<u64> {
        self.read_array(field).map(u64::from_le_bytes)
    }

    fn read_i32(&mut self, field: &'static str) -> Result<i32> {
        self.read_array(field).map(i32::from_le_bytes)
    }

    fn read_string(&mut self, field: &'static str) -> Result<String> {
        let len = self.read_u64(field)?;
        let at = self.offset;
        let bytes = self.take(field, len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::corrupt(format!("{field} at offset {at} is not valid UTF-8")))
    }
}
