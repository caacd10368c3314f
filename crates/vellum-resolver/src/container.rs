use std::io::{Cursor, Read};

use crate::error::{ResolverError, ResolverResult};

/// ZIP local-file-header signature (`PK\x03\x04`). Every ZIP-based package
/// (OPC/Office documents included) starts with these four bytes.
pub const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

/// Whether the bytes look like a ZIP-based package.
pub fn is_zip_package(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[..4] == ZIP_SIGNATURE
}

/// Extract a sub-entry from a ZIP container by its segment path.
///
/// Matching runs three passes over the entries, each in the container's
/// native enumeration order, taking the first hit:
///
/// 1. exact path match, case-insensitive
/// 2. suffix match on `/<path>`
/// 3. substring match
///
/// The native-order tie-break is deliberate and load-bearing: containers
/// are not enumerated alphabetically, so two entries matching the same
/// suffix resolve to whichever the container lists first, every time.
pub fn extract_entry(bytes: &[u8], path: &str, uri: &str) -> ResolverResult<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        ResolverError::Container {
            uri: uri.to_string(),
            reason: e.to_string(),
        }
    })?;

    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.name_for_index(i).unwrap_or_default().to_string())
        .collect();

    let suffix = format!("/{path}");
    let index = names
        .iter()
        .position(|name| name.eq_ignore_ascii_case(path))
        .or_else(|| names.iter().position(|name| name.ends_with(&suffix)))
        .or_else(|| names.iter().position(|name| name.contains(path)))
        .ok_or_else(|| ResolverError::SegmentNotFound {
            uri: uri.to_string(),
            path: path.to_string(),
        })?;

    let mut entry = archive.by_index(index).map_err(|e| ResolverError::Container {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;
    let mut content = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut content)
        .map_err(|e| ResolverError::Container {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Build a stored (uncompressed) ZIP with entries in the given order.
    pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn zip_signature_detection() {
        let zipped = build_zip(&[("a.txt", b"a")]);
        assert!(is_zip_package(&zipped));
        assert!(!is_zip_package(b"\\documentclass{article}"));
        assert!(!is_zip_package(b"PK"));
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let zipped = build_zip(&[("Word/Document.xml", b"exact")]);
        let content = extract_entry(&zipped, "word/document.xml", "doc://t").unwrap();
        assert_eq!(content, b"exact");
    }

    #[test]
    fn exact_beats_suffix_and_substring() {
        let zipped = build_zip(&[
            ("nested/word/document.xml", b"suffix"),
            ("word/document.xml", b"exact"),
        ]);
        let content = extract_entry(&zipped, "word/document.xml", "doc://t").unwrap();
        assert_eq!(content, b"exact");
    }

    #[test]
    fn suffix_match_when_no_exact() {
        let zipped = build_zip(&[("pkg/word/document.xml", b"suffix")]);
        let content = extract_entry(&zipped, "word/document.xml", "doc://t").unwrap();
        assert_eq!(content, b"suffix");
    }

    #[test]
    fn substring_match_as_last_resort() {
        let zipped = build_zip(&[("a/document.xml.rels", b"substr")]);
        let content = extract_entry(&zipped, "document.xml", "doc://t").unwrap();
        assert_eq!(content, b"substr");
    }

    #[test]
    fn first_entry_in_native_order_wins() {
        // Deliberately non-alphabetical entry order: "z/..." precedes "a/...".
        let zipped = build_zip(&[
            ("z/word/document.xml", b"first"),
            ("a/word/document.xml", b"second"),
        ]);
        let content = extract_entry(&zipped, "word/document.xml", "doc://t").unwrap();
        assert_eq!(content, b"first");
    }

    #[test]
    fn missing_entry_reported() {
        let zipped = build_zip(&[("only.txt", b"x")]);
        let err = extract_entry(&zipped, "word/document.xml", "doc://t").unwrap_err();
        assert!(matches!(err, ResolverError::SegmentNotFound { .. }));
    }

    #[test]
    fn non_zip_bytes_rejected() {
        let err = extract_entry(b"not a zip", "a", "doc://t").unwrap_err();
        assert!(matches!(err, ResolverError::Container { .. }));
    }
}
