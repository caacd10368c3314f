//! Context serialization and sanitization.
//!
//! Two distinct treatments of the generation context, never mixed:
//! hashing always uses the raw context through [`canonical_context_json`];
//! storage provenance always uses [`sanitize_context`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use vellum_types::HashAlgorithm;

/// Serialize a context to canonical JSON with object keys sorted
/// lexicographically at every depth.
///
/// Sorting makes the serialization independent of the key order the caller
/// built the context in, so two contexts with the same entries always hash
/// identically.
pub fn canonical_context_json(context: &Value) -> String {
    let mut out = String::new();
    write_canonical(context, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Key serialization through serde_json handles escaping.
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

/// Hash a template's bytes followed by the canonical serialization of its
/// context.
///
/// Uses the raw context, never the sanitized form: sanitization is lossy
/// and exists only for provenance records.
pub fn content_hash_for(template: &[u8], context: &Value, algorithm: HashAlgorithm) -> String {
    let mut buf = Vec::with_capacity(template.len() + 64);
    buf.extend_from_slice(template);
    buf.extend_from_slice(canonical_context_json(context).as_bytes());
    vellum_hash::compute_content_hash(&buf, algorithm)
}

/// Produce the provenance-safe form of a context.
///
/// Recursive: RFC 3339 timestamp strings are rewritten to a fixed UTC
/// second-precision format so provenance records for the same logical
/// instant compare equal across timezones and sub-second noise.
pub fn sanitize_context(context: &Value) -> Value {
    match context {
        Value::String(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(ts) => Value::String(
                ts.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            Err(_) => context.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(sanitize_context).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), sanitize_context(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_change_serialization() {
        let a: Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        assert_eq!(canonical_context_json(&a), canonical_context_json(&b));
    }

    #[test]
    fn nested_keys_are_sorted_too() {
        let a: Value = serde_json::from_str(r#"{"outer":{"z":1,"a":2}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"outer":{"a":2,"z":1}}"#).unwrap();
        assert_eq!(canonical_context_json(&a), canonical_context_json(&b));
        assert_eq!(canonical_context_json(&a), r#"{"outer":{"a":2,"z":1}}"#);
    }

    #[test]
    fn content_hash_is_key_order_independent() {
        let a = json!({"title": "Report", "year": 2026});
        let b: Value = serde_json::from_str(r#"{"year":2026,"title":"Report"}"#).unwrap();
        let ha = content_hash_for(b"template", &a, HashAlgorithm::Sha256);
        let hb = content_hash_for(b"template", &b, HashAlgorithm::Sha256);
        assert_eq!(ha, hb);
    }

    #[test]
    fn content_hash_depends_on_template_and_context() {
        let ctx = json!({"a": 1});
        let base = content_hash_for(b"t1", &ctx, HashAlgorithm::Sha256);
        assert_ne!(base, content_hash_for(b"t2", &ctx, HashAlgorithm::Sha256));
        assert_ne!(
            base,
            content_hash_for(b"t1", &json!({"a": 2}), HashAlgorithm::Sha256)
        );
    }

    #[test]
    fn timestamps_normalize_to_utc_seconds() {
        let ctx = json!({
            "generated": "2026-08-29T10:15:30.123456+02:00",
            "title": "unchanged",
        });
        let clean = sanitize_context(&ctx);
        assert_eq!(clean["generated"], "2026-08-29T08:15:30Z");
        assert_eq!(clean["title"], "unchanged");
    }

    #[test]
    fn sanitize_recurses_into_arrays_and_objects() {
        let ctx = json!({"rows": [{"at": "2026-01-01T00:00:00Z"}], "n": 3});
        let clean = sanitize_context(&ctx);
        assert_eq!(clean["rows"][0]["at"], "2026-01-01T00:00:00Z");
        assert_eq!(clean["n"], 3);
    }

    #[test]
    fn sanitize_never_feeds_hashing() {
        // The raw and sanitized contexts serialize differently, so the hash
        // must come from the raw form.
        let ctx = json!({"at": "2026-08-29T10:15:30.5+02:00"});
        let clean = sanitize_context(&ctx);
        assert_ne!(canonical_context_json(&ctx), canonical_context_json(&clean));
    }
}
