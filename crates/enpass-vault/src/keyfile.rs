//! Keyfile decoding.
//!
//! An Enpass keyfile is a small XML document whose single text-bearing
//! element holds the key as hex, e.g.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <key>9f86d081884c7d659a2feaa0c55ad015</key>
//! ```
//!
//! The decoded bytes are appended to the master password before key
//! derivation.

use std::path::Path;

use enpass_crypto_core::SecretBuffer;
use quick_xml::events::Event;
use quick_xml::Reader;
use zeroize::Zeroize;

use crate::error::{KeyfileError, VaultError};

/// Read a keyfile and return the raw key bytes it encodes.
///
/// # Errors
///
/// - [`VaultError::NotFound`] / [`VaultError::Io`] if the file cannot be read
/// - [`VaultError::Keyfile`] with [`KeyfileError::Xml`], [`KeyfileError::Empty`]
///   or [`KeyfileError::Hex`] depending on the layer that failed
pub fn load_keyfile(path: &Path) -> Result<SecretBuffer, VaultError> {
    let mut contents = std::fs::read(path).map_err(|e| VaultError::io(path, e))?;
    let result = decode_keyfile(&contents).map_err(|source| VaultError::Keyfile {
        path: path.to_path_buf(),
        source,
    });
    contents.zeroize();
    result
}

/// Decode keyfile contents already in memory.
///
/// # Errors
///
/// See [`load_keyfile`].
pub fn decode_keyfile(contents: &[u8]) -> Result<SecretBuffer, KeyfileError> {
    let mut hex = key_text(contents)?;
    let decoded = data_encoding::HEXLOWER_PERMISSIVE
        .decode(hex.as_bytes())
        .map_err(KeyfileError::Hex);
    hex.zeroize();
    Ok(SecretBuffer::from_vec(decoded?))
}

/// Walk the whole document and return the first non-blank text found inside
/// an element. Reading to the end keeps malformed trailing markup an error.
fn key_text(contents: &[u8]) -> Result<String, KeyfileError> {
    let xml = std::str::from_utf8(contents).map_err(|e| KeyfileError::Xml(e.to_string()))?;
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth: usize = 0;
    let mut seen_element = false;
    let mut key: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                depth = depth.saturating_add(1);
                seen_element = true;
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Empty(_)) => seen_element = true,
            Ok(Event::Text(text)) if depth > 0 && key.is_none() => {
                let unescaped = text
                    .unescape()
                    .map_err(|e| KeyfileError::Xml(e.to_string()))?;
                let trimmed = unescaped.trim();
                if !trimmed.is_empty() {
                    key = Some(trimmed.to_string());
                }
            }
            Ok(Event::CData(data)) if depth > 0 && key.is_none() => {
                let raw =
                    std::str::from_utf8(&data).map_err(|e| KeyfileError::Xml(e.to_string()))?;
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    key = Some(trimmed.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(KeyfileError::Xml(e.to_string())),
        }
    }

    if !seen_element {
        return Err(KeyfileError::Xml("no root element".into()));
    }
    key.ok_or(KeyfileError::Empty)
}
