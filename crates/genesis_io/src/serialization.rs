//! Gzip JSON files and content digests.

use crate::error::{IoError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Writes `data` as gzip-compressed JSON. The file is replaced atomically
/// via a temporary sibling.
pub fn write_json_gz<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let tmp = path.with_extension("tmp");
    {
        let file = File::create(&tmp)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, data)?;
        let mut writer = encoder.finish().map_err(|e| IoError::Gzip(e.to_string()))?;
        writer.flush()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads gzip-compressed JSON written by [`write_json_gz`].
pub fn read_json_gz<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::MissingSnapshot(path.to_path_buf()));
    }
    let mut decoder = GzDecoder::new(BufReader::new(File::open(path)?));
    let mut json = Vec::new();
    decoder
        .read_to_end(&mut json)
        .map_err(|e| IoError::Gzip(e.to_string()))?;
    Ok(serde_json::from_slice(&json)?)
}

/// SHA-256 hex digest of the JSON encoding of `data`.
pub fn json_digest<T: Serialize>(data: &T) -> Result<String> {
    let json = serde_json::to_string(data)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
