//! Snapshot payload codec: bincode followed by a Brotli pass.

use std::io::{Read, Write};

use fetcher_core::{FetcherState, STATE_VERSION};

/// File extension of encoded snapshots.
pub const CODEC_EXTENSION: &str = "brotli";

const BROTLI_BUFFER_SIZE: usize = 4096;
const BROTLI_QUALITY: u32 = 9;
const BROTLI_LG_WINDOW: u32 = 22;

/// Largest decompressed snapshot accepted by [`decode`].
pub const MAX_SNAPSHOT_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to serialize state: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to deserialize state: {0}")]
    Decode(#[source] bincode::Error),
    #[error("compression error: {0}")]
    Compression(#[from] std::io::Error),
    #[error("decompressed snapshot exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("snapshot has schema version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
}

pub fn encode(state: &FetcherState) -> Result<Vec<u8>, CodecError> {
    let raw = bincode::serialize(state).map_err(CodecError::Encode)?;

    let mut compressed = Vec::with_capacity(raw.len() / 2);
    {
        let mut writer = brotli::CompressorWriter::new(
            &mut compressed,
            BROTLI_BUFFER_SIZE,
            BROTLI_QUALITY,
            BROTLI_LG_WINDOW,
        );
        writer.write_all(&raw)?;
        writer.flush()?;
        // Dropping the writer terminates the Brotli stream.
    }
    Ok(compressed)
}

pub fn decode(bytes: &[u8]) -> Result<FetcherState, CodecError> {
    decode_with_limit(bytes, MAX_SNAPSHOT_BYTES)
}

fn decode_with_limit(bytes: &[u8], limit: u64) -> Result<FetcherState, CodecError> {
    let mut raw = Vec::new();
    brotli::Decompressor::new(bytes, BROTLI_BUFFER_SIZE)
        .take(limit + 1)
        .read_to_end(&mut raw)?;
    if raw.len() as u64 > limit {
        return Err(CodecError::TooLarge { limit });
    }

    let state: FetcherState = bincode::deserialize(&raw).map_err(CodecError::Decode)?;
    if state.version != STATE_VERSION {
        return Err(CodecError::VersionMismatch {
            found: state.version,
            expected: STATE_VERSION,
        });
    }
    Ok(state)
}
