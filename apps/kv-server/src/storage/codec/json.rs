// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON encoding: a single top-level object of string arrays, pretty-printed.

use super::{Codec, CodecError, Snapshot};

const FORMAT: &str = "json";

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn decode(&self, raw: &[u8]) -> Result<Snapshot, CodecError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Snapshot::new());
        }
        serde_json::from_slice(raw).map_err(|e| CodecError::decode(FORMAT, e))
    }

    fn encode(&self, snapshot: &Snapshot) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec_pretty(snapshot).map_err(|e| CodecError::encode(FORMAT, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::codec::sample_snapshot;

    #[test]
    fn round_trip_allows_spaces_in_values() {
        let mut snapshot = sample_snapshot();
        snapshot.insert("city".into(), vec!["new york".into(), "".into()]);

        let raw = JsonCodec.encode(&snapshot).unwrap();
        assert_eq!(JsonCodec.decode(&raw).unwrap(), snapshot);
    }

    #[test]
    fn encode_is_indented() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("k".into(), vec!["v".into()]);

        let text = String::from_utf8(JsonCodec.encode(&snapshot).unwrap()).unwrap();
        assert_eq!(text, "{\n  \"k\": [\n    \"v\"\n  ]\n}");
    }

    #[test]
    fn empty_file_is_empty_snapshot() {
        assert!(JsonCodec.decode(b"").unwrap().is_empty());
        assert!(JsonCodec.decode(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_list_values() {
        let result = JsonCodec.decode(br#"{"k": "not a list"}"#);
        assert!(matches!(result, Err(CodecError::Decode { format: "json", .. })));
    }

    #[test]
    fn rejects_truncated_input() {
        assert!(JsonCodec.decode(br#"{"k": ["v""#).is_err());
    }
}
