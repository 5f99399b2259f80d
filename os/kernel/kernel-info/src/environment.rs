//! # Boot Environment
//!
//! The boot loader passes a NUL-terminated text block of `key=value` lines.
//! Lines starting with `#` are comments; whitespace around keys and values is
//! ignored, as are lines without `=`.

/// Parsed view over the environment block.
#[derive(Copy, Clone, Debug)]
pub struct Environment<'a> {
    text: &'a str,
}

impl<'a> Environment<'a> {
    /// Interprets `bytes` up to the first NUL. Non-UTF-8 content yields an
    /// empty environment.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let text = core::str::from_utf8(&bytes[..end]).unwrap_or("");
        Self { text }
    }

    /// All `(key, value)` pairs in order of appearance.
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, &'a str)> + use<'a> {
        let text = self.text;
        text.lines().filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            Some((key.trim(), value.trim()))
        })
    }

    /// Value of the last occurrence of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.entries().filter(|(k, _)| *k == key).map(|(_, v)| v).last()
    }
}
