use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UriError;

/// Digest algorithms accepted in `doc://` identity URIs.
///
/// Each algorithm has a fixed hex digest width; a hash whose length does not
/// match its algorithm's width is rejected at parse time, before any I/O.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
    Blake3,
}

impl HashAlgorithm {
    /// Length of the hex-encoded digest for this algorithm.
    pub const fn hex_len(&self) -> usize {
        match self {
            Self::Sha256 | Self::Blake3 => 64,
            Self::Sha512 => 128,
        }
    }

    /// The canonical lowercase name used in URIs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Blake3 => "blake3",
        }
    }

    /// All supported algorithms, in preference order.
    pub const fn all() -> [HashAlgorithm; 3] {
        [Self::Sha256, Self::Sha512, Self::Blake3]
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::Sha256
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            "blake3" => Ok(Self::Blake3),
            other => Err(UriError::UnknownAlgorithm(other.to_string())),
        }
    }
}
