use crate::codec;
use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::lzw;
use std::fs::{self, create_dir_all, File};
use std::io::{Read, Write};
use std::path::Path;

/// Serialize and compress an index into the on-disk byte layout.
pub fn to_bytes(index: &InvertedIndex) -> Result<Vec<u8>> {
    let raw = codec::encode(index)?;
    let codes = lzw::compress(&raw);
    tracing::debug!(raw_bytes = raw.len(), codes = codes.len(), "index compressed");
    Ok(lzw::codes_to_bytes(&codes))
}

/// Inverse of [`to_bytes`]. Fails on any corrupt or short input.
pub fn from_bytes(bytes: &[u8]) -> Result<InvertedIndex> {
    let codes = lzw::codes_from_bytes(bytes)?;
    let raw = lzw::decompress(&codes)?;
    codec::decode(&raw)
}

pub fn save_index<P: AsRef<Path>>(path: P, index: &InvertedIndex) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let bytes = to_bytes(index)?;
    let mut f = File::create(path).map_err(|e| Error::io(path, e))?;
    f.write_all(&bytes).map_err(|e| Error::io(path, e))?;
    tracing::info!(path = %path.display(), terms = index.term_count(), bytes = bytes.len(), "index saved");
    Ok(())
}

pub fn load_index<P: AsRef<Path>>(path: P) -> Result<InvertedIndex> {
    let path = path.as_ref();
    let mut f = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).map_err(|e| Error::io(path, e))?;
    let index = from_bytes(&buf)?;
    tracing::info!(path = %path.display(), terms = index.term_count(), "index loaded");
    Ok(index)
}

/// Size of the index file on disk, for reporting.
pub fn index_file_len<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    fs::metadata(path).map(|m| m.len()).map_err(|e| Error::io(path, e))
}
