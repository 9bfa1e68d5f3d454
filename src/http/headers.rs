//! Header collection.
//!
//! Field names are stored lowercased in first-insertion order, so the header
//! block written back out is deterministic. A name seen more than once keeps a
//! single entry whose value is the comma-joined list of everything received.

use crate::http::parser::ParseError;
use crate::http::tokens::{self, COLON, CRLF, SP};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses at most one header line from the start of `buf`.
    ///
    /// Returns the number of bytes consumed and whether the blank line ending
    /// the header section was reached. `Ok((0, false))` means the line is not
    /// complete yet and the caller has to come back with more bytes.
    ///
    /// On error nothing is consumed and the collection is left untouched.
    pub fn parse(&mut self, buf: &[u8]) -> Result<(usize, bool), ParseError> {
        let Some(line_end) = tokens::find_crlf(buf) else {
            return Ok((0, false));
        };

        if line_end == 0 {
            return Ok((CRLF.len(), true));
        }

        let line = &buf[..line_end];
        let colon = line
            .iter()
            .position(|&b| b == COLON)
            .ok_or(ParseError::MalformedHeader)?;

        if colon == 0 || line[colon - 1] == SP {
            return Err(ParseError::MalformedHeader);
        }

        let name = line[..colon].trim_ascii();
        if name.is_empty() || !name.iter().all(|&b| tokens::is_token_byte(b)) {
            return Err(ParseError::InvalidHeaderName);
        }

        // token bytes are ASCII; obs-text in a value becomes U+FFFD
        let name = String::from_utf8_lossy(name);
        let value = String::from_utf8_lossy(line[colon + 1..].trim_ascii());
        self.set(&name, &value);

        Ok((line_end + CRLF.len(), false))
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Adds a value, joining it onto an existing one with `", "`.
    pub fn set(&mut self, name: &str, value: &str) {
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => self
                .entries
                .push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    /// Overwrites any existing value for `name`.
    pub fn replace(&mut self, name: &str, value: &str) {
        self.delete(name);
        self.entries
            .push((name.to_ascii_lowercase(), value.to_string()));
    }

    pub fn delete(&mut self, name: &str) {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
