//! Incremental frame decoding
//!
//! Network reads never line up with frame boundaries, so bytes are held in a
//! pending buffer and only complete lines are decoded. Lines are split on
//! raw `\n` bytes before UTF-8 decoding; a multi-byte character cut in half
//! by a read is reassembled before anything looks at it.

use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::debug;

use crate::infrastructure::log_messages::client;
use crate::streaming::encoder::DATA_PREFIX;

/// Parse one line of the stream
///
/// Returns `None` for blank lines, non-data lines, and data lines whose
/// payload does not decode. A trailing `\r` is tolerated.
pub fn parse_frame_line<E: DeserializeOwned>(line: &str) -> Option<E> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();
    if payload.is_empty() {
        return None;
    }

    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(error = %e, "{}", client::FRAME_DISCARDED);
            None
        }
    }
}

/// Stateful decoder for one response body
#[derive(Debug)]
pub struct FrameDecoder<E> {
    pending: Vec<u8>,
    _event: PhantomData<fn() -> E>,
}

impl<E> Default for FrameDecoder<E> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            _event: PhantomData,
        }
    }
}

impl<E: DeserializeOwned> FrameDecoder<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and decode every line it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<E> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);
        decode_lines(&complete)
    }

    /// Decode whatever is left once the body has ended
    ///
    /// The buffer is drained, so a second call yields nothing.
    pub fn finish(&mut self) -> Vec<E> {
        let remaining = std::mem::take(&mut self.pending);
        decode_lines(&remaining)
    }

    /// Bytes held back waiting for a line terminator
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn decode_lines<E: DeserializeOwned>(bytes: &[u8]) -> Vec<E> {
    bytes
        .split(|b| *b == b'\n')
        .filter(|line| !line.is_empty())
        .filter_map(|line| parse_frame_line(&String::from_utf8_lossy(line)))
        .collect()
}
