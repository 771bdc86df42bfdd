//! Storage key derivation.
//!
//! Distinct names can sanitize to the same key (`"a b"` and `"a?b"` both
//! become `a_b`); the later save overwrites the earlier one.

/// Replace every character that is not an ASCII letter, digit or hyphen
/// with an underscore.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Build the storage key for a name and a resolved extension.
pub fn derive_key(name: &str, extension: &str) -> String {
    let mut key = sanitize_name(name);
    key.push_str(extension);
    key
}
