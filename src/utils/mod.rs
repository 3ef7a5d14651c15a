use rand::{rngs::OsRng, RngCore};
use std::fmt::Write;

/// Number of random bytes behind a project API key.
pub const API_KEY_BYTES: usize = 32;

/// Derives a URL slug from a project name: lowercase, whitespace runs become a
/// single hyphen, anything outside `[a-z0-9-]` is dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }

    slug
}

/// 32 bytes from the OS CSPRNG, hex encoded (64 chars).
pub fn generate_api_key() -> String {
    let mut key_bytes = [0u8; API_KEY_BYTES];
    OsRng.fill_bytes(&mut key_bytes);

    key_bytes
        .iter()
        .fold(String::with_capacity(API_KEY_BYTES * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

/// Extension of an uploaded file name, dot included, restricted to ASCII
/// alphanumerics. Empty when the name has none.
pub fn file_extension(filename: &str) -> String {
    let ext: String = std::path::Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    if ext.is_empty() {
        String::new()
    } else {
        format!(".{ext}")
    }
}
