//! SSE decoding for OpenAI streaming completions.

use bytes::Bytes;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use serde::Deserialize;

use crate::completion::CompletionError;
use crate::json_utils;
use crate::streaming::{ChunkStream, StreamChunk};

#[derive(Debug, Deserialize)]
pub struct StreamingCompletionChunk {
    pub choices: Vec<StreamingChoice>,
}

#[derive(Debug, Deserialize)]
pub struct StreamingChoice {
    pub delta: StreamingDelta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StreamingDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "json_utils::null_or_vec")]
    pub tool_calls: Vec<StreamingToolCall>,
}

#[derive(Debug, Deserialize)]
pub struct StreamingToolCall {
    pub index: usize,
    #[serde(default)]
    pub id: Option<String>,
    pub function: StreamingFunction,
}

#[derive(Debug, Deserialize)]
pub struct StreamingFunction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

/// Decode an OpenAI SSE byte stream into [StreamChunk]s.
///
/// Frames may arrive split at arbitrary byte boundaries; `eventsource-stream`
/// reassembles them before parsing. The `[DONE]` sentinel yields
/// [StreamChunk::Done]; a frame that fails to parse terminates the sequence
/// with [CompletionError::MalformedStream], and a byte stream that ends
/// without the sentinel terminates with
/// [CompletionError::UnexpectedEndOfStream].
pub(crate) fn decode<S>(byte_stream: S) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, CompletionError>> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        // The byte stream is not necessarily Unpin; pin the event stream so
        // it can be polled.
        let mut events = Box::pin(byte_stream.eventsource());

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

            if event.data.trim() == "[DONE]" {
                yield Ok(StreamChunk::Done);
                return;
            }

            let chunk: StreamingCompletionChunk = match serde_json::from_str(&event.data) {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::warn!(error = %e, data = %event.data, "undecodable stream frame");
                    yield Err(CompletionError::MalformedStream(format!(
                        "undecodable stream frame: {e}"
                    )));
                    return;
                }
            };

            for choice in chunk.choices {
                if let Some(content) = choice.delta.content {
                    if !content.is_empty() {
                        yield Ok(StreamChunk::TextDelta(content));
                    }
                }
                for call in choice.delta.tool_calls {
                    yield Ok(StreamChunk::FunctionCallDelta {
                        index: call.index,
                        id: call.id,
                        name: call.function.name,
                        arguments: call.function.arguments,
                    });
                }
            }
        }

        yield Err(CompletionError::UnexpectedEndOfStream);
    })
}
