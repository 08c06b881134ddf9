//! Single-`*` wildcard matching for S3 keys
//!
//! A pattern is split on its first `*` into a `left` and `right` part. A
//! candidate key matches when it starts with `left` and `right` occurs
//! anywhere in the remainder. Note that `right` is deliberately not anchored
//! to the end of the key, so `data/*.csv` also matches
//! `data/report.csv.bak` — looser than full glob semantics, kept for
//! compatibility with existing callers.
//!
//! Exactly one `*` is supported. Additional `*` characters end up inside
//! `right` and are matched literally.

/// Derive the listing prefix for a wildcard pattern: everything up to and
/// including the last `/`. Patterns without a slash list under `/`, which
/// matches no real keys.
pub fn listing_prefix(pattern: &str) -> String {
    match pattern.rfind('/') {
        Some(idx) => pattern[..=idx].to_string(),
        None => "/".to_string(),
    }
}

/// Check a key against a single-`*` pattern.
///
/// Patterns without a `*` only match the key exactly.
pub fn key_matches(key: &str, pattern: &str) -> bool {
    match pattern.split_once('*') {
        Some((left, right)) => key
            .strip_prefix(left)
            .is_some_and(|rest| rest.contains(right)),
        None => key == pattern,
    }
}

/// Filter listed keys through the pattern, skipping directory placeholders
pub fn filter_keys<'a, I>(keys: I, pattern: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter()
        .filter(|key| !key.ends_with('/'))
        .filter(|key| key_matches(key, pattern))
        .map(str::to_string)
        .collect()
}
