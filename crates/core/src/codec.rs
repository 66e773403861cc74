// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload compression codecs

use flate2::read::{DeflateDecoder, GzDecoder};
use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;
use thiserror::Error;

/// Compression algorithm applied to an overflow payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    None,
    #[default]
    Gzip,
    Deflate,
    Lz4,
}

impl CompressionType {
    pub const ALL: [CompressionType; 4] = [
        CompressionType::None,
        CompressionType::Gzip,
        CompressionType::Deflate,
        CompressionType::Lz4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionType::None => "none",
            CompressionType::Gzip => "gzip",
            CompressionType::Deflate => "deflate",
            CompressionType::Lz4 => "lz4",
        }
    }

    /// Fixed estimate of how much of the achievable reduction the
    /// algorithm realizes (1.0 = no reduction).
    pub fn efficiency(&self) -> f64 {
        match self {
            CompressionType::None => 1.0,
            CompressionType::Gzip => 0.3,
            CompressionType::Deflate => 0.35,
            CompressionType::Lz4 => 0.5,
        }
    }

    /// Next algorithm to try when this one keeps failing.
    pub fn alternative(&self) -> CompressionType {
        match self {
            CompressionType::Gzip => CompressionType::Lz4,
            CompressionType::Deflate => CompressionType::Lz4,
            CompressionType::Lz4 => CompressionType::Gzip,
            CompressionType::None => CompressionType::None,
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(CompressionType::None),
            "gzip" => Ok(CompressionType::Gzip),
            "deflate" => Ok(CompressionType::Deflate),
            "lz4" => Ok(CompressionType::Lz4),
            other => Err(CodecError::UnknownAlgorithm(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unknown compression algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("{algorithm} compression failed: {source}")]
    Compress {
        algorithm: CompressionType,
        #[source]
        source: std::io::Error,
    },
    #[error("{algorithm} decompression failed: corrupt stream: {message}")]
    Decompress {
        algorithm: CompressionType,
        message: String,
    },
}

/// Default level for the flate-based codecs
pub const DEFAULT_LEVEL: u32 = 6;

/// Compress `data` at the default level.
pub fn compress(data: &[u8], algorithm: CompressionType) -> Result<Vec<u8>, CodecError> {
    compress_with_level(data, algorithm, DEFAULT_LEVEL)
}

/// Compress `data`; `level` (0-9) applies to gzip and deflate only.
pub fn compress_with_level(
    data: &[u8],
    algorithm: CompressionType,
    level: u32,
) -> Result<Vec<u8>, CodecError> {
    let level = Compression::new(level.min(9));
    let wrap = |source| CodecError::Compress { algorithm, source };

    match algorithm {
        CompressionType::None => Ok(data.to_vec()),
        CompressionType::Gzip => {
            let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), level);
            encoder.write_all(data).map_err(wrap)?;
            encoder.finish().map_err(wrap)
        }
        CompressionType::Deflate => {
            let mut encoder = DeflateEncoder::new(Vec::with_capacity(data.len() / 2), level);
            encoder.write_all(data).map_err(wrap)?;
            encoder.finish().map_err(wrap)
        }
        CompressionType::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
    }
}

/// Inverse of [`compress`].
pub fn decompress(data: &[u8], algorithm: CompressionType) -> Result<Vec<u8>, CodecError> {
    let corrupt = |message: String| CodecError::Decompress { algorithm, message };

    match algorithm {
        CompressionType::None => Ok(data.to_vec()),
        CompressionType::Gzip => {
            let mut out = Vec::with_capacity(data.len() * 2);
            GzDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(|e| corrupt(e.to_string()))?;
            Ok(out)
        }
        CompressionType::Deflate => {
            let mut out = Vec::with_capacity(data.len() * 2);
            DeflateDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(|e| corrupt(e.to_string()))?;
            Ok(out)
        }
        CompressionType::Lz4 => {
            lz4_flex::decompress_size_prepended(data).map_err(|e| corrupt(e.to_string()))
        }
    }
}

/// Compression backend behind the storage manager
pub trait Codec: Send + Sync {
    fn compress(
        &self,
        data: &[u8],
        algorithm: CompressionType,
        level: u32,
    ) -> Result<Vec<u8>, CodecError>;

    fn decompress(&self, data: &[u8], algorithm: CompressionType) -> Result<Vec<u8>, CodecError>;
}

/// flate2 and lz4_flex, via [`compress_with_level`] and [`decompress`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodec;

impl Codec for StandardCodec {
    fn compress(
        &self,
        data: &[u8],
        algorithm: CompressionType,
        level: u32,
    ) -> Result<Vec<u8>, CodecError> {
        compress_with_level(data, algorithm, level)
    }

    fn decompress(&self, data: &[u8], algorithm: CompressionType) -> Result<Vec<u8>, CodecError> {
        decompress(data, algorithm)
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
