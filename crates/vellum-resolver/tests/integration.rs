//! End-to-end resolution tests over an in-memory store.

use std::io::Write;
use std::sync::Arc;

use vellum_resolver::{
    BatchOptions, NormalizeError, PackageNormalizer, ResolveOptions, ResolverConfig,
    ResolverError, StoreOptions, UriResolver,
};
use vellum_store::{ContentStore, InMemoryContentStore};
use vellum_types::{ContentMetadata, HashAlgorithm, UriError};

fn resolver_over(store: Arc<InMemoryContentStore>) -> UriResolver {
    UriResolver::new(store, ResolverConfig::default())
}

fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Rebuilds a ZIP with its entries sorted by name, so two packages with
/// the same entries in different order normalize to identical bytes.
struct EntryOrderNormalizer;

impl PackageNormalizer for EntryOrderNormalizer {
    fn normalize(&self, bytes: &[u8]) -> Result<Vec<u8>, NormalizeError> {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
            .map_err(|e| NormalizeError::new(e.to_string()))?;
        let mut entries = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| NormalizeError::new(e.to_string()))?;
            let name = entry.name().to_string();
            let mut content = Vec::new();
            std::io::Read::read_to_end(&mut entry, &mut content)
                .map_err(|e| NormalizeError::new(e.to_string()))?;
            entries.push((name, content));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, content) in &entries {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| NormalizeError::new(e.to_string()))?;
            writer
                .write_all(content)
                .map_err(|e| NormalizeError::new(e.to_string()))?;
        }
        writer
            .finish()
            .map(|cursor| cursor.into_inner())
            .map_err(|e| NormalizeError::new(e.to_string()))
    }
}

#[tokio::test]
async fn normalized_packages_share_one_address() {
    let store = Arc::new(InMemoryContentStore::new());
    let resolver = UriResolver::new(store, ResolverConfig::default())
        .with_normalizer(Arc::new(EntryOrderNormalizer));

    // Same entries, different serialization order: byte-distinct packages.
    let forward = build_zip(&[("a.xml", b"alpha".as_slice()), ("b.xml", b"beta".as_slice())]);
    let reversed = build_zip(&[("b.xml", b"beta".as_slice()), ("a.xml", b"alpha".as_slice())]);
    assert_ne!(forward, reversed);

    let first = resolver
        .store_document(&forward, ContentMetadata::default(), &StoreOptions::default())
        .await
        .unwrap();
    let second = resolver
        .store_document(&reversed, ContentMetadata::default(), &StoreOptions::default())
        .await
        .unwrap();

    // Normalization ran before hashing, so both land under one URI and the
    // second write is a dedup hit.
    assert!(first.normalized);
    assert!(second.normalized);
    assert_eq!(first.uri, second.uri);
    assert!(!first.existed);
    assert!(second.existed);

    // Bypassing normalization hashes the raw serialization instead.
    let raw = resolver
        .store_document(
            &reversed,
            ContentMetadata::default(),
            &StoreOptions {
                skip_normalization: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!raw.normalized);
    assert_ne!(raw.uri, first.uri);
}

#[tokio::test]
async fn store_then_resolve_roundtrip() {
    // Store the 10-byte digit sequence and resolve it by its address.
    let store = Arc::new(InMemoryContentStore::new());
    let resolver = resolver_over(store);

    let stored = resolver
        .store_document(b"0123456789", ContentMetadata::default(), &StoreOptions::default())
        .await
        .unwrap();
    assert_eq!(
        stored.uri.to_string(),
        "doc://sha256/84d89877f0d4041efb6bf91a16f0248f2fd573e6af05c19f96bedb9f882f7882"
    );
    assert!(!stored.existed);

    let resolution = resolver
        .resolve(&stored.uri.to_string(), &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(resolution.content, b"0123456789");
    assert!(resolution.resolved);
    assert!(resolution.canonical);
    assert!(!resolution.from_cache);

    // Resolved content re-hashes to the URI's hash.
    let recomputed = vellum_resolver::compute_content_hash(&resolution.content, HashAlgorithm::Sha256);
    assert_eq!(recomputed, stored.hash);
}

#[tokio::test]
async fn second_resolution_hits_cache() {
    let store = Arc::new(InMemoryContentStore::new());
    let resolver = resolver_over(store);

    let stored = resolver
        .store_document(b"cached content", ContentMetadata::default(), &StoreOptions::default())
        .await
        .unwrap();
    let uri = stored.uri.to_string();

    let first = resolver.resolve(&uri, &ResolveOptions::default()).await.unwrap();
    let second = resolver.resolve(&uri, &ResolveOptions::default()).await.unwrap();
    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.content, second.content);

    resolver.clear_cache();
    let third = resolver.resolve(&uri, &ResolveOptions::default()).await.unwrap();
    assert!(!third.from_cache);
}

#[tokio::test]
async fn tampered_content_fails_integrity() {
    let store = Arc::new(InMemoryContentStore::new());
    let resolver = resolver_over(store.clone());

    let stored = resolver
        .store_document(b"original bytes", ContentMetadata::default(), &StoreOptions::default())
        .await
        .unwrap();

    // Mutate the stored bytes without updating the referencing URI.
    assert!(store.corrupt(&stored.hash, b"tampered bytes".to_vec()));

    let err = resolver
        .resolve(&stored.uri.to_string(), &ResolveOptions::default())
        .await
        .unwrap_err();
    match err {
        ResolverError::IntegrityMismatch { expected, computed, .. } => {
            assert_eq!(expected, stored.hash);
            assert_ne!(computed, expected);
        }
        other => panic!("expected IntegrityMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn segment_extraction_is_deterministic() {
    let store = Arc::new(InMemoryContentStore::new());
    let resolver = resolver_over(store);

    let package = build_zip(&[
        ("[Content_Types].xml", b"types".as_slice()),
        ("word/document.xml", b"<w:document/>".as_slice()),
    ]);
    let stored = resolver
        .store_document(&package, ContentMetadata::default(), &StoreOptions::default())
        .await
        .unwrap();

    let uri = format!("{}/word/document.xml", stored.uri);
    for _ in 0..3 {
        let resolution = resolver.resolve(&uri, &ResolveOptions::default()).await.unwrap();
        assert_eq!(resolution.content, b"<w:document/>");
        assert!(resolution.canonical);
    }
}

#[tokio::test]
async fn batch_preserves_input_order() {
    let store = Arc::new(InMemoryContentStore::new());
    let resolver = resolver_over(store);

    let mut uris = Vec::new();
    for payload in ["alpha", "beta", "gamma", "delta", "epsilon", "zeta"] {
        let stored = resolver
            .store_document(payload.as_bytes(), ContentMetadata::default(), &StoreOptions::default())
            .await
            .unwrap();
        uris.push(stored.uri.to_string());
    }
    // Sprinkle a failure mid-batch: it must not abort the rest.
    uris.insert(3, format!("doc://sha256/{}", "f".repeat(64)));

    let results = resolver.batch_resolve(&uris, &BatchOptions::default()).await;
    assert_eq!(results.len(), 7);
    for (i, payload) in ["alpha", "beta", "gamma"].iter().enumerate() {
        assert_eq!(results[i].as_ref().unwrap().content, payload.as_bytes());
    }
    assert!(matches!(results[3], Err(ResolverError::NotFound(_))));
    for (i, payload) in ["delta", "epsilon", "zeta"].iter().enumerate() {
        assert_eq!(results[i + 4].as_ref().unwrap().content, payload.as_bytes());
    }
}

#[tokio::test]
async fn short_hash_rejected_before_any_io() {
    // An empty store: if parsing hit the store at all, we would see
    // NotFound. We must see InvalidUri instead.
    let store = Arc::new(InMemoryContentStore::new());
    let resolver = resolver_over(store.clone());

    let err = resolver
        .resolve("doc://sha256/deadbeef", &ResolveOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResolverError::InvalidUri(UriError::InvalidHashLength { .. })
    ));
    assert!(store.is_empty());
}

#[tokio::test]
async fn unsupported_scheme_rejected() {
    let store = Arc::new(InMemoryContentStore::new());
    let resolver = resolver_over(store);
    let err = resolver
        .resolve("ftp://host/file", &ResolveOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResolverError::InvalidUri(UriError::UnsupportedScheme(_))
    ));
}

#[tokio::test]
async fn file_resolution_is_never_canonical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template.tex");
    tokio::fs::write(&path, b"\\documentclass{article}").await.unwrap();

    let store = Arc::new(InMemoryContentStore::new());
    let resolver = resolver_over(store);

    let resolution = resolver
        .resolve(&format!("file://{}", path.display()), &ResolveOptions::default())
        .await
        .unwrap();
    assert!(resolution.resolved);
    assert!(!resolution.canonical);
    assert_eq!(resolution.content, b"\\documentclass{article}");
}

#[tokio::test]
async fn canonicalize_promotes_file_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.tex");
    tokio::fs::write(&path, b"content to promote").await.unwrap();

    let store = Arc::new(InMemoryContentStore::new());
    let resolver = resolver_over(store.clone());

    let source = format!("file://{}", path.display());
    let promoted = resolver.canonicalize(&source, &StoreOptions::default()).await.unwrap();
    assert!(!promoted.already_canonical);
    assert_eq!(promoted.source, source);

    // The new canonical URI resolves to the original bytes, with the
    // original source recorded as provenance.
    let resolution = resolver
        .resolve(&promoted.uri.to_string(), &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(resolution.content, b"content to promote");
    let provenance = resolution.metadata.provenance.unwrap();
    assert_eq!(provenance.original_source.unwrap(), source);

    // Canonicalizing the canonical URI is the identity.
    let again = resolver
        .canonicalize(&promoted.uri.to_string(), &StoreOptions::default())
        .await
        .unwrap();
    assert!(again.already_canonical);
    assert_eq!(again.uri, promoted.uri);
}

#[tokio::test]
async fn duplicate_store_deduplicates() {
    let store = Arc::new(InMemoryContentStore::new());
    let resolver = resolver_over(store.clone());

    let first = resolver
        .store_document(b"same bytes", ContentMetadata::default(), &StoreOptions::default())
        .await
        .unwrap();
    let second = resolver
        .store_document(b"same bytes", ContentMetadata::default(), &StoreOptions::default())
        .await
        .unwrap();
    assert!(!first.existed);
    assert!(second.existed);
    assert_eq!(first.uri, second.uri);
    assert_eq!(store.len(), 1);
}
