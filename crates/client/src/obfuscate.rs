//! Reversible encoding for personal fields written to device storage.
//!
//! Values are percent-encoded and then base64-encoded. This keeps an email or
//! phone number from being readable at a glance in a storage dump. It is NOT
//! encryption: anyone with the stored value can reverse it, and nothing here
//! should be relied on for confidentiality.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode `text` for storage.
#[must_use]
pub fn obfuscate(text: &str) -> String {
    STANDARD.encode(urlencoding::encode(text).as_bytes())
}

/// Reverse [`obfuscate`].
///
/// Returns `text` unchanged when it is not an obfuscated value, so plain
/// values written by older builds still load.
#[must_use]
pub fn reveal(text: &str) -> String {
    try_reveal(text).unwrap_or_else(|| text.to_owned())
}

fn try_reveal(text: &str) -> Option<String> {
    let bytes = STANDARD.decode(text).ok()?;
    let encoded = String::from_utf8(bytes).ok()?;
    urlencoding::decode(&encoded).ok().map(|s| s.into_owned())
}
