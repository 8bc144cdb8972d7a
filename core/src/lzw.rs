//! LZW over raw bytes with fixed-width 32-bit codes.
//!
//! The dictionary starts with the 256 single-byte strings and grows by one
//! entry per emitted code. Codes are not bit-packed; each is stored as a
//! little-endian `u32`.

use crate::error::{Error, Result};
use std::collections::HashMap;

const CODE_WIDTH: usize = std::mem::size_of::<u32>();

/// Codes stop being assigned once the next code would not fit in a `u32`.
const CODE_LIMIT: u32 = u32::MAX;

pub fn compress(input: &[u8]) -> Vec<u32> {
    let Some((&first, rest)) = input.split_first() else {
        return Vec::new();
    };
    // (code of current string, next byte) -> code of the extension
    let mut dictionary: HashMap<(u32, u8), u32> = HashMap::new();
    let mut next_code: u32 = 256;
    let mut codes = Vec::new();
    let mut current = u32::from(first);
    for &byte in rest {
        match dictionary.get(&(current, byte)) {
            Some(&code) => current = code,
            None => {
                codes.push(current);
                if next_code < CODE_LIMIT {
                    dictionary.insert((current, byte), next_code);
                    next_code += 1;
                }
                current = u32::from(byte);
            }
        }
    }
    codes.push(current);
    codes
}

pub fn decompress(codes: &[u32]) -> Result<Vec<u8>> {
    let Some((&first, rest)) = codes.split_first() else {
        return Ok(Vec::new());
    };
    let mut entries: Vec<Vec<u8>> = (0..=u8::MAX).map(|b| vec![b]).collect();
    let mut previous = match entries.get(first as usize) {
        Some(e) => e.clone(),
        None => return Err(unknown_code(first, 0, entries.len())),
    };
    let mut out = previous.clone();

    for (i, &code) in rest.iter().enumerate() {
        let idx = code as usize;
        let entry = if idx < entries.len() {
            entries[idx].clone()
        } else if idx == entries.len() && entries.len() < CODE_LIMIT as usize {
            // code being defined by this very step: previous + its own first byte
            let mut e = previous.clone();
            e.push(previous[0]);
            e
        } else {
            return Err(unknown_code(code, i + 1, entries.len()));
        };
        out.extend_from_slice(&entry);
        if entries.len() < CODE_LIMIT as usize {
            let mut grown = previous;
            grown.push(entry[0]);
            entries.push(grown);
        }
        previous = entry;
    }
    Ok(out)
}

fn unknown_code(code: u32, position: usize, dictionary_size: usize) -> Error {
    Error::corrupt(format!(
        "unknown LZW code {code} at position {position} (dictionary size {dictionary_size})"
    ))
}

pub fn codes_to_bytes(codes: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(codes.len() * CODE_WIDTH);
    for code in codes {
        out.extend_from_slice(&code.to_le_bytes());
    }
    out
}

/// Split a byte stream back into codes. A trailing partial code is `TruncatedInput`.
pub fn codes_from_bytes(bytes: &[u8]) -> Result<Vec<u32>> {
    let chunks = bytes.chunks_exact(CODE_WIDTH);
    let tail = chunks.remainder().len();
    if tail != 0 {
        return Err(Error::TruncatedInput {
            field: "lzw code",
            offset: bytes.len() - tail,
            needed: CODE_WIDTH as u64,
            available: tail,
        });
    }
    Ok(chunks
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
