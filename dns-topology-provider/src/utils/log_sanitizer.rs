//! Log sanitization utilities
//!
//! Keeps response bodies, TXT challenge tokens and access keys from being fully
//! exposed in debug/error logs.

/// Maximum number of characters to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

/// Number of leading characters of a secret that stay visible.
const MASK_VISIBLE: usize = 4;

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
///
/// Returns the original string if it's within the limit, otherwise the first
/// `TRUNCATE_LIMIT` bytes with a suffix giving the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask a credential, keeping only its first few characters.
///
/// `AKIDEXAMPLE` becomes `AKID****`. Short values are masked entirely.
pub fn mask_secret(s: &str) -> String {
    if s.len() <= MASK_VISIBLE * 2 {
        return "****".to_string();
    }
    format!("{}****", &s[..floor_char_boundary(s, MASK_VISIBLE)])
}

/// Mask the `Credential=` and `Signature=` parts of a SigV4 `Authorization` header.
pub fn sanitize_authorization(header: &str) -> String {
    header
        .split(", ")
        .map(|part| {
            if let Some((prefix, rest)) = part.split_once("Credential=") {
                let (key, scope) = rest.split_once('/').unwrap_or((rest, ""));
                format!("{prefix}Credential={}/{scope}", mask_secret(key))
            } else if part.starts_with("Signature=") {
                "Signature=****".to_string()
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
