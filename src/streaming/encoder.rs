//! Event stream framing
//!
//! One frame per event: `data:` immediately followed by the event's JSON and
//! a blank line. Frames are encoded independently, so a consumer can
//! resynchronize at any line boundary.

use bytes::Bytes;
use futures_util::stream::{self, Stream};
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tracing::warn;

use crate::infrastructure::log_messages::encoding;

pub const DATA_PREFIX: &str = "data:";
pub const FRAME_TERMINATOR: &str = "\n\n";

/// Encode a single event as a complete frame
pub fn encode_frame<E: Serialize>(event: &E) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_string(event)?;
    let mut frame = String::with_capacity(DATA_PREFIX.len() + json.len() + FRAME_TERMINATOR.len());
    frame.push_str(DATA_PREFIX);
    frame.push_str(&json);
    frame.push_str(FRAME_TERMINATOR);
    Ok(Bytes::from(frame))
}

/// Turn the single-writer event channel into a byte stream of frames
///
/// The stream ends when every sender has been dropped. An event that fails
/// to serialize is skipped; the remaining frames are unaffected.
pub fn frame_stream<E>(
    receiver: mpsc::Receiver<E>,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static
where
    E: Serialize + Send + 'static,
{
    stream::unfold(receiver, |mut receiver| async move {
        loop {
            let event = receiver.recv().await?;
            match encode_frame(&event) {
                Ok(frame) => return Some((Ok(frame), receiver)),
                Err(e) => warn!(error = %e, "{}", encoding::EVENT_UNSERIALIZABLE),
            }
        }
    })
}
