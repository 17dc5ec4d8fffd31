//! Publishing accepted expressions so they can be shared and restored.
//!
//! A share hash is `#` followed by the standard base64 encoding of the
//! expression text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::PlotError;

/// Receives every accepted, non-replayed expression.
pub trait Persistence {
  fn publish(&mut self, text: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPersistence;

impl Persistence for NullPersistence {
  fn publish(&mut self, _text: &str) {}
}

pub fn encode_hash(text: &str) -> String {
  format!("#{}", BASE64.encode(text.as_bytes()))
}

/// Decode a share hash. The leading `#` is optional and an empty hash
/// decodes to an empty string.
pub fn decode_hash(hash: &str) -> Result<String, PlotError> {
  let body = hash.strip_prefix('#').unwrap_or(hash);
  let bytes = BASE64
    .decode(body.trim())
    .map_err(|e| PlotError::Hash(e.to_string()))?;
  String::from_utf8(bytes).map_err(|e| PlotError::Hash(e.to_string()))
}

/// A browser-style history of share hashes: `publish` pushes a new entry,
/// `back` pops to the previous one and returns the text to restore.
#[derive(Debug, Default, Clone)]
pub struct HashHistory {
  entries: Vec<String>,
}

impl HashHistory {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn entries(&self) -> &[String] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// The hash of the most recent entry.
  pub fn current(&self) -> Option<&str> {
    self.entries.last().map(String::as_str)
  }

  /// Text of the most recent entry.
  pub fn current_text(&self) -> Option<String> {
    self.current().and_then(|h| decode_hash(h).ok())
  }

  /// Step back one entry and return the text it holds.
  pub fn back(&mut self) -> Option<String> {
    self.entries.pop()?;
    self.current_text()
  }
}

impl Persistence for HashHistory {
  fn publish(&mut self, text: &str) {
    self.entries.push(encode_hash(text));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encodes_like_btoa() {
    assert_eq!(encode_hash("x + y"), "#eCArIHk=");
    assert_eq!(decode_hash("#eCArIHk=").unwrap(), "x + y");
    assert_eq!(decode_hash("eCArIHk=").unwrap(), "x + y");
  }

  #[test]
  fn empty_hash_is_empty_text() {
    assert_eq!(decode_hash("#").unwrap(), "");
    assert_eq!(decode_hash("").unwrap(), "");
  }

  #[test]
  fn garbage_is_rejected() {
    assert!(matches!(decode_hash("#!!!"), Err(PlotError::Hash(_))));
  }

  #[test]
  fn back_returns_previous_text() {
    let mut history = HashHistory::new();
    history.publish("x");
    history.publish("y");
    assert_eq!(history.current_text().as_deref(), Some("y"));
    assert_eq!(history.back().as_deref(), Some("x"));
    assert_eq!(history.back(), None);
  }
}
