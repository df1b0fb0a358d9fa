//! Identifier and tag-value normalization.
//!
//! Remote resource names and tag values are derived from mutable,
//! arbitrary-length Kubernetes names. Anything over the platform limit is
//! truncated and made unique again with an 8-hex-char SHA-1 suffix, so the
//! same input always maps to the same remote identifier.

use std::collections::HashMap;
use std::fmt::Write as _;

use sha1::{Digest, Sha1};

/// Maximum byte length of a tag scope or value on the remote platform.
pub const MAX_TAG_LENGTH: usize = 256;
/// Maximum byte length of a resource id.
pub const MAX_ID_LENGTH: usize = 255;
/// Maximum byte length of a resource display name.
pub const MAX_NAME_LENGTH: usize = 80;
/// Hex characters of the SHA-1 digest kept as a truncation suffix.
pub const HASH_LENGTH: usize = 8;

/// Lowercase hex SHA-1 of `data`.
pub fn sha1_hex(data: &str) -> String {
    let digest = Sha1::digest(data.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Normalize a tag value to [`MAX_TAG_LENGTH`].
pub fn normalize_name(name: &str) -> String {
    normalize_name_by_limit(name, MAX_TAG_LENGTH)
}

/// Bound `name` to `limit` bytes, keeping uniqueness via a hash suffix.
///
/// Inputs already within the limit are returned unchanged, which makes the
/// function idempotent on its own in-limit output. Oversized inputs become
/// `name[..limit-9] + "-" + sha1(name)[..8]`.
pub fn normalize_name_by_limit(name: &str, limit: usize) -> String {
    if name.len() <= limit {
        return name.to_string();
    }
    let hash = sha1_hex(name);
    if limit <= HASH_LENGTH + 1 {
        // No room for any prefix; the hash alone still identifies the input.
        return hash[..limit].to_string();
    }
    let keep = floor_char_boundary(name, limit - HASH_LENGTH - 1);
    format!("{}-{}", &name[..keep], &hash[..HASH_LENGTH])
}

/// Normalize a label key: keys over the limit are reduced to the segment
/// after the last `/` before normalizing.
pub fn normalize_label_key(key: &str) -> String {
    if key.len() <= MAX_TAG_LENGTH {
        return key.to_string();
    }
    let last = key.rsplit('/').next().unwrap_or(key);
    normalize_name(last)
}

/// Normalize every key and value of a label map.
pub fn normalize_labels(labels: &HashMap<String, String>) -> HashMap<String, String> {
    labels
        .iter()
        .map(|(k, v)| (normalize_label_key(k), normalize_name(v)))
        .collect()
}

/// Normalize a resource id: `:` separators become `_`, and oversized ids are
/// truncated with a hash suffix. The truncation point walks back over `-`,
/// `.` and `_` so the suffix separator never lands inside a punctuation run.
pub fn normalize_id(name: &str) -> String {
    let replaced = name.replace(':', "_");
    if replaced.len() <= MAX_ID_LENGTH {
        return replaced;
    }
    // The suffix hashes the original id, separators intact.
    let hash = sha1_hex(name);
    let bytes = replaced.as_bytes();
    let mut keep = MAX_ID_LENGTH - HASH_LENGTH - 1;
    while keep > 0 && matches!(bytes[keep - 1], b'-' | b'.' | b'_') {
        keep -= 1;
    }
    let keep = floor_char_boundary(&replaced, keep);
    format!("{}-{}", &replaced[..keep], &hash[..HASH_LENGTH])
}

/// Compose a resource id as `prefix_res-id_index_suffix`, with empty parts
/// contributing no separator.
pub fn generate_id(res_id: &str, prefix: &str, suffix: &str, index: &str) -> String {
    join_non_empty('_', &[prefix, res_id, index, suffix])
}

/// Compose a display name as `prefix-cluster-res-name-project-suffix`, with
/// empty parts contributing no separator.
pub fn generate_display_name(
    res_name: &str,
    prefix: &str,
    suffix: &str,
    project: &str,
    cluster: &str,
) -> String {
    join_non_empty('-', &[prefix, cluster, res_name, project, suffix])
}

/// Compose `cluster-res_name-project` bounded by `limit`, reserving room for
/// administrator-supplied `prefix`/`suffix`. Only the inner segment gets
/// hashed when over budget; prefix and suffix always survive verbatim.
pub fn generate_truncated_name(
    limit: usize,
    res_name: &str,
    prefix: &str,
    suffix: &str,
    project: &str,
    cluster: &str,
) -> String {
    let mut adjusted = limit
        .saturating_sub(prefix.len())
        .saturating_sub(suffix.len());
    for part in [prefix, suffix] {
        if !part.is_empty() {
            adjusted = adjusted.saturating_sub(1);
        }
    }
    let inner = generate_display_name(res_name, "", "", project, cluster);
    if inner.len() > adjusted {
        let truncated = normalize_name_by_limit(&inner, adjusted);
        return generate_display_name(&truncated, prefix, suffix, "", "");
    }
    generate_display_name(res_name, prefix, suffix, project, cluster)
}

fn join_non_empty(sep: char, parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts {
        if part.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(sep);
        }
        out.push_str(part);
    }
    out
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_pass_through() {
        assert_eq!(normalize_name("web"), "web");
        assert_eq!(normalize_name_by_limit("abcde", 5), "abcde");
    }

    #[test]
    fn long_names_are_bounded_and_deterministic() {
        let name = "x".repeat(300);
        let out = normalize_name(&name);
        assert_eq!(out.len(), MAX_TAG_LENGTH);
        assert_eq!(out, normalize_name(&name));
        // Idempotent once within the limit.
        assert_eq!(normalize_name(&out), out);
        // Prefix kept, 9 bytes reserved for "-<hash8>".
        assert!(out.starts_with(&name[..MAX_TAG_LENGTH - 9]));
        assert_eq!(out.as_bytes()[MAX_TAG_LENGTH - 9], b'-');
    }

    #[test]
    fn shared_prefix_inputs_differ_by_hash_suffix() {
        let a = format!("{}a", "p".repeat(300));
        let b = format!("{}b", "p".repeat(300));
        let na = normalize_name_by_limit(&a, 40);
        let nb = normalize_name_by_limit(&b, 40);
        assert_eq!(na[..31], nb[..31]);
        assert_ne!(na, nb);
    }

    #[test]
    fn tiny_limits_still_hold_the_bound() {
        for limit in 0..12 {
            let out = normalize_name_by_limit(&"y".repeat(64), limit);
            assert!(out.len() <= limit, "limit={} out={}", limit, out);
        }
    }

    #[test]
    fn label_key_uses_last_slash_segment() {
        let key = "short/key";
        assert_eq!(normalize_label_key(key), key);
        let long = format!("{}/suffix-part", "k".repeat(300));
        assert_eq!(normalize_label_key(&long), "suffix-part");
    }

    #[test]
    fn normalize_labels_applies_both_sides() {
        let mut labels = HashMap::new();
        labels.insert("app".to_string(), "web".to_string());
        labels.insert(format!("{}/tier", "d".repeat(300)), "x".repeat(300));
        let out = normalize_labels(&labels);
        assert_eq!(out.get("app").map(String::as_str), Some("web"));
        let v = out.get("tier").unwrap();
        assert_eq!(v.len(), MAX_TAG_LENGTH);
    }

    #[test]
    fn id_substitutes_colons() {
        assert_eq!(normalize_id("proj:ns:subnet"), "proj_ns_subnet");
    }

    #[test]
    fn long_id_truncation_skips_punctuation_runs() {
        // Place a run of separators right at the truncation point.
        let head = "a".repeat(MAX_ID_LENGTH - HASH_LENGTH - 4);
        let name = format!("{}---{}", head, "b".repeat(40));
        let out = normalize_id(&name);
        assert!(out.len() <= MAX_ID_LENGTH);
        // The kept prefix must not end in '-', '.' or '_' before the hash.
        let prefix = &out[..out.len() - HASH_LENGTH - 1];
        assert!(!prefix.ends_with(['-', '.', '_']));
    }

    #[test]
    fn display_name_skips_empty_parts() {
        assert_eq!(generate_display_name("subnet", "", "", "", ""), "subnet");
        assert_eq!(
            generate_display_name("subnet", "pre", "suf", "proj", "cl"),
            "pre-cl-subnet-proj-suf"
        );
        assert_eq!(generate_id("res", "", "", ""), "res");
        assert_eq!(generate_id("res", "sr", "tail", "2"), "sr_res_2_tail");
    }

    #[test]
    fn truncated_name_keeps_prefix_and_suffix_verbatim() {
        let out = generate_truncated_name(40, &"n".repeat(64), "pre", "suf", "proj", "cluster");
        assert!(out.len() <= 40);
        assert!(out.starts_with("pre-"));
        assert!(out.ends_with("-suf"));
        // Inner segment carries the hash suffix before "-suf".
        let inner = &out[4..out.len() - 4];
        assert_eq!(inner.as_bytes()[inner.len() - 9], b'-');
    }

    #[test]
    fn truncated_name_unchanged_when_within_budget() {
        assert_eq!(
            generate_truncated_name(80, "subnet", "pre", "suf", "proj", "cl"),
            "pre-cl-subnet-proj-suf"
        );
    }

    #[test]
    fn sha1_matches_known_vector() {
        assert_eq!(sha1_hex("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }
}
