// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Whitespace-delimited line encoding.
//!
//! ```text
//! # comment
//! fruit apple banana
//! empty
//! ```
//!
//! Tokens are split on whitespace, so neither keys nor values may contain
//! any. Records that would not survive a round-trip are rejected on encode.

use super::{Codec, CodecError, Snapshot};

const FORMAT: &str = "plain";
const COMMENT_MARKER: char = '#';

#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl LineCodec {
    /// Parse line-encoded text. Shared with the encrypted codec.
    pub(crate) fn decode_str(&self, text: &str) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
                continue;
            }

            let mut tokens = trimmed.split_whitespace();
            if let Some(key) = tokens.next() {
                // Repeated keys: the last line wins.
                snapshot.insert(key.to_string(), tokens.map(str::to_string).collect());
            }
        }
        snapshot
    }

    /// Render a snapshot as line-encoded text. Shared with the encrypted codec.
    pub(crate) fn encode_string(&self, snapshot: &Snapshot) -> Result<String, CodecError> {
        let mut lines = Vec::with_capacity(snapshot.len());
        for (key, values) in snapshot {
            check_key(key)?;
            let mut line = key.clone();
            for value in values {
                check_value(key, value)?;
                line.push(' ');
                line.push_str(value);
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }
}

fn unrepresentable(key: &str, reason: &'static str) -> CodecError {
    CodecError::Unrepresentable {
        format: FORMAT,
        key: key.to_string(),
        reason,
    }
}

fn check_key(key: &str) -> Result<(), CodecError> {
    if key.is_empty() {
        return Err(unrepresentable(key, "key is empty"));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(unrepresentable(key, "key contains whitespace"));
    }
    if key.starts_with(COMMENT_MARKER) {
        return Err(unrepresentable(key, "key starts with the comment marker"));
    }
    Ok(())
}

fn check_value(key: &str, value: &str) -> Result<(), CodecError> {
    if value.is_empty() {
        return Err(unrepresentable(key, "value is empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(unrepresentable(key, "value contains whitespace"));
    }
    Ok(())
}

impl Codec for LineCodec {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn decode(&self, raw: &[u8]) -> Result<Snapshot, CodecError> {
        let text = std::str::from_utf8(raw).map_err(|e| CodecError::decode(FORMAT, e))?;
        Ok(self.decode_str(text))
    }

    fn encode(&self, snapshot: &Snapshot) -> Result<Vec<u8>, CodecError> {
        self.encode_string(snapshot).map(String::into_bytes)
    }
}
