use std::fmt;

use serde::{Deserialize, Serialize};

use crate::algorithm::HashAlgorithm;
use crate::error::UriError;

/// Content-addressed document identity.
///
/// Grammar: `doc://<algorithm>/<hash>[/<segment>]*`
///
/// The hash is a fixed-width lowercase hex digest; trailing segments name a
/// path inside a multi-file container. Two `DocUri`s are equal iff their
/// (algorithm, hash, segments) tuples are equal. Content addressed by a
/// `doc://` URI is canonical; content from any other scheme is not.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocUri {
    pub algorithm: HashAlgorithm,
    pub hash: String,
    pub segments: Vec<String>,
}

impl DocUri {
    /// Build a URI from an algorithm and a digest, with no segments.
    ///
    /// Returns `Err` if the digest width or characters do not match the
    /// algorithm.
    pub fn new(algorithm: HashAlgorithm, hash: impl Into<String>) -> Result<Self, UriError> {
        let hash = hash.into().to_ascii_lowercase();
        validate_hash(algorithm, &hash)?;
        Ok(Self {
            algorithm,
            hash,
            segments: Vec::new(),
        })
    }

    /// Parse a `doc://` URI string. Pure: performs no I/O.
    ///
    /// Rejects empty input, fewer than two non-empty path components, an
    /// unknown algorithm, and a hash whose length or characters do not match
    /// the algorithm's fixed digest width.
    pub fn parse(input: &str) -> Result<Self, UriError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(UriError::Empty);
        }
        let rest = input
            .strip_prefix("doc://")
            .ok_or_else(|| UriError::MissingScheme(input.to_string()))?;

        let parts: Vec<&str> = rest.split('/').filter(|p| !p.is_empty()).collect();
        if parts.len() < 2 {
            return Err(UriError::MissingComponents(input.to_string()));
        }

        let algorithm: HashAlgorithm = parts[0].parse()?;
        let hash = parts[1].to_ascii_lowercase();
        validate_hash(algorithm, &hash)?;

        Ok(Self {
            algorithm,
            hash,
            segments: parts[2..].iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Add container path segments to this URI.
    pub fn with_segments(mut self, segments: impl IntoIterator<Item = String>) -> Self {
        self.segments.extend(segments);
        self
    }

    /// The same URI without its container segments.
    pub fn root(&self) -> Self {
        Self {
            algorithm: self.algorithm,
            hash: self.hash.clone(),
            segments: Vec::new(),
        }
    }

    /// Whether this URI addresses a sub-entry inside a container.
    pub fn has_segments(&self) -> bool {
        !self.segments.is_empty()
    }

    /// The container path the segments name, joined with `/`.
    pub fn segment_path(&self) -> String {
        self.segments.join("/")
    }

    /// Abbreviated form for logs: `doc://sha256/ab12cd34…`.
    pub fn short(&self) -> String {
        format!("doc://{}/{}…", self.algorithm, &self.hash[..8.min(self.hash.len())])
    }
}

fn validate_hash(algorithm: HashAlgorithm, hash: &str) -> Result<(), UriError> {
    if hash.len() != algorithm.hex_len() {
        return Err(UriError::InvalidHashLength {
            algorithm: algorithm.to_string(),
            expected: algorithm.hex_len(),
            actual: hash.len(),
        });
    }
    if !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(UriError::InvalidHex(hash.to_string()));
    }
    Ok(())
}

impl fmt::Display for DocUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc://{}/{}", self.algorithm, self.hash)?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Any resolvable source reference.
///
/// Only the `Doc` variant is canonical; `File` and `Http` sources can be
/// promoted to canonical form by storing their resolved bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceRef {
    /// Canonical content-addressed identity.
    Doc(DocUri),
    /// A local filesystem path (`file://` URI or the path after the scheme).
    File(String),
    /// A remote `http://` or `https://` URL, kept verbatim.
    Http(String),
}

impl SourceRef {
    /// Parse any supported source URI, dispatching on scheme.
    pub fn parse(input: &str) -> Result<Self, UriError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(UriError::Empty);
        }
        if input.starts_with("doc://") {
            return Ok(Self::Doc(DocUri::parse(input)?));
        }
        if let Some(path) = input.strip_prefix("file://") {
            if path.is_empty() {
                return Err(UriError::MissingComponents(input.to_string()));
            }
            return Ok(Self::File(path.to_string()));
        }
        if input.starts_with("http://") || input.starts_with("https://") {
            return Ok(Self::Http(input.to_string()));
        }
        match input.split_once("://") {
            Some((scheme, _)) => Err(UriError::UnsupportedScheme(scheme.to_string())),
            None => Err(UriError::MissingScheme(input.to_string())),
        }
    }

    /// Whether this reference addresses canonical content.
    pub fn is_canonical(&self) -> bool {
        matches!(self, Self::Doc(_))
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doc(uri) => uri.fmt(f),
            Self::File(path) => write!(f, "file://{path}"),
            Self::Http(url) => f.write_str(url),
        }
    }
}
