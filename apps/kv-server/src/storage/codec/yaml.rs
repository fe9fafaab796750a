// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! YAML encoding. Same shape as the JSON codec, different syntax.

use super::{Codec, CodecError, Snapshot};

const FORMAT: &str = "yaml";

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn decode(&self, raw: &[u8]) -> Result<Snapshot, CodecError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Snapshot::new());
        }
        serde_yaml::from_slice(raw).map_err(|e| CodecError::decode(FORMAT, e))
    }

    fn encode(&self, snapshot: &Snapshot) -> Result<Vec<u8>, CodecError> {
        serde_yaml::to_string(snapshot)
            .map(String::into_bytes)
            .map_err(|e| CodecError::encode(FORMAT, e))
    }
}
