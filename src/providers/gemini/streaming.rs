//! SSE decoding for Gemini streaming completions.
//!
//! Gemini has no `[DONE]` sentinel; the stream terminates with a candidate
//! carrying a `finishReason`. Function calls arrive whole in a single frame
//! rather than fragmented, so each one becomes a single delta with a fresh
//! index.

use bytes::Bytes;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::{Stream, StreamExt};

use super::completion::GenerateContentResponse;
use crate::completion::CompletionError;
use crate::streaming::{ChunkStream, StreamChunk};

pub(crate) fn decode<S>(byte_stream: S) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, CompletionError>> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        // The byte stream is not necessarily Unpin; pin the event stream so
        // it can be polled.
        let mut events = Box::pin(byte_stream.eventsource());
        let mut call_index = 0usize;

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(EventStreamError::Transport(e)) => {
                    yield Err(e);
                    return;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "invalid SSE frame");
                    yield Err(CompletionError::MalformedStream(e.to_string()));
                    return;
                }
            };

            let response: GenerateContentResponse = match serde_json::from_str(&event.data) {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(error = %e, data = %event.data, "undecodable stream frame");
                    yield Err(CompletionError::MalformedStream(format!(
                        "undecodable stream frame: {e}"
                    )));
                    return;
                }
            };

            let Some(candidate) = response.candidates.into_iter().next() else {
                continue;
            };
            let finished = candidate.finish_reason.is_some();

            if let Some(content) = candidate.content {
                for part in content.parts {
                    if let Some(text) = part.text {
                        if !text.is_empty() {
                            yield Ok(StreamChunk::TextDelta(text));
                        }
                    }
                    if let Some(call) = part.function_call {
                        yield Ok(StreamChunk::FunctionCallDelta {
                            index: call_index,
                            id: None,
                            name: Some(call.name),
                            arguments: Some(call.args.to_string()),
                        });
                        call_index += 1;
                    }
                }
            }

            if finished {
                yield Ok(StreamChunk::Done);
                return;
            }
        }

        yield Err(CompletionError::UnexpectedEndOfStream);
    })
}
