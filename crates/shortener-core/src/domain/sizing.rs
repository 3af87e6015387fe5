//! Bus payload size accounting
//!
//! Mirrors the bus's own rules for PutEvents entry size:
//!
//! | component | bytes |
//! |-----------|-------|
//! | `time` present | 14 |
//! | `source` | UTF-8 length |
//! | `detail-type` | UTF-8 length |
//! | `detail` | length of canonical JSON |
//! | each non-empty resource | UTF-8 length |
//!
//! Canonical JSON separates items with `", "` and keys from values with
//! `": "`, and escapes everything outside printable ASCII as `\uXXXX`
//! (astral characters as surrogate pairs). Object keys come out sorted
//! because `serde_json::Map` is ordered.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};

use crate::domain::event::EventEnvelope;
use crate::error::EventError;

/// Fixed overhead charged when the event carries a `time` field
pub const TIME_FIELD_OVERHEAD: usize = 14;

/// Computes the byte size the event occupies on the bus.
pub fn estimate_size(event: &EventEnvelope) -> Result<usize, EventError> {
    let mut size = 0;

    if event.has_time() {
        size += TIME_FIELD_OVERHEAD;
    }
    size += event.source()?.len();
    size += event.detail_type()?.len();
    size += canonical_json_len(event.detail()?)?;

    for resource in event.resources()? {
        if !resource.is_empty() {
            size += resource.len();
        }
    }

    tracing::trace!(event_size = size, "estimated event size");
    Ok(size)
}

/// Canonical JSON text of `detail`.
pub fn canonical_json(detail: &Map<String, Value>) -> Result<String, EventError> {
    let mut out = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, SpacedAsciiFormatter);
    detail
        .serialize(&mut serializer)
        .map_err(|e| EventError::Unserializable(e.to_string()))?;
    String::from_utf8(out).map_err(|e| EventError::Unserializable(e.to_string()))
}

fn canonical_json_len(detail: &Map<String, Value>) -> Result<usize, EventError> {
    canonical_json(detail).map(|json| json.len())
}

/// Spaced separators, ASCII-only output.
struct SpacedAsciiFormatter;

impl Formatter for SpacedAsciiFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units).iter() {
                writer.write_all(format!("\\u{:04x}", unit).as_bytes())?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
