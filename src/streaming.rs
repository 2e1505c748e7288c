//! Streaming completion support.
//!
//! Provider streaming modules decode their wire format into a stream of
//! [StreamChunk] values. [CompletionStream] wraps that stream with the
//! caller-facing semantics: it lazily yields text fragments as they arrive,
//! accumulates function-call deltas per index, and once the provider signals
//! termination it assembles the final assistant [Message] and appends it to
//! the conversation. The stream is single-pass and forward-only; dropping it
//! early releases the underlying transport, and cancelling it surfaces
//! [CompletionError::Cancelled] without touching the conversation.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{AbortHandle, Abortable};
use futures::{Stream, StreamExt};

use crate::completion::CompletionError;
use crate::conversation::Conversation;
use crate::message::{FunctionCall, Message};

/// One incremental unit emitted while decoding a streaming completion.
///
/// Chunks are yielded strictly in arrival order and consumed exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamChunk {
    /// A fragment of the assistant's text response.
    TextDelta(String),
    /// A fragment of a function call. Multiple calls may be in flight at
    /// once, keyed by `index`; name and argument fragments for one index are
    /// concatenated in arrival order.
    FunctionCallDelta {
        index: usize,
        id: Option<String>,
        name: Option<String>,
        arguments: Option<String>,
    },
    /// The provider's explicit termination signal.
    Done,
}

/// A stream of decoded chunks produced by a provider streaming module.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, CompletionError>> + Send>>;

#[derive(Debug, Default)]
struct PartialCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

/// Accumulates chunks into the final assistant message: full text plus one
/// assembled [FunctionCall] per index, in ascending index order.
#[derive(Debug, Default)]
pub(crate) struct StreamAccumulator {
    text: String,
    calls: BTreeMap<usize, PartialCall>,
}

impl StreamAccumulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn absorb(&mut self, chunk: &StreamChunk) {
        match chunk {
            StreamChunk::TextDelta(text) => self.text.push_str(text),
            StreamChunk::FunctionCallDelta {
                index,
                id,
                name,
                arguments,
            } => {
                let call = self.calls.entry(*index).or_default();
                if let Some(id) = id {
                    call.id = Some(id.clone());
                }
                if let Some(name) = name {
                    call.name.push_str(name);
                }
                if let Some(arguments) = arguments {
                    call.arguments.push_str(arguments);
                }
            }
            StreamChunk::Done => {}
        }
    }

    /// Materialize the accumulated state into an assistant message.
    ///
    /// Fails with [CompletionError::MalformedStream] if a call index received
    /// argument fragments but never a name.
    pub(crate) fn finalize(self) -> Result<Message, CompletionError> {
        let mut function_calls = Vec::with_capacity(self.calls.len());
        for (index, call) in self.calls {
            if call.name.is_empty() {
                return Err(CompletionError::MalformedStream(format!(
                    "function call at index {index} has no name"
                )));
            }
            let arguments = if call.arguments.is_empty() {
                None
            } else {
                Some(call.arguments)
            };
            let assembled = match call.id {
                Some(id) => FunctionCall::with_id(id, call.name, arguments)?,
                None => FunctionCall::new(call.name, arguments)?,
            };
            function_calls.push(assembled);
        }

        let content = if self.text.is_empty() {
            None
        } else {
            Some(self.text)
        };

        Ok(Message::assistant_with_calls(content, function_calls))
    }
}

enum StreamState {
    Streaming,
    Finished,
}

/// The caller-facing view of a streaming completion: a lazy, single-pass
/// stream of plain text fragments.
///
/// The stream borrows the conversation mutably for its lifetime; the final
/// assistant turn is appended only after the provider's termination signal is
/// observed. On error or cancellation the conversation is left unmodified.
pub struct CompletionStream<'a> {
    inner: Abortable<ChunkStream>,
    abort_handle: AbortHandle,
    conversation: &'a mut Conversation,
    accumulator: StreamAccumulator,
    state: StreamState,
    message: Option<Message>,
}

impl<'a> CompletionStream<'a> {
    pub(crate) fn new(inner: ChunkStream, conversation: &'a mut Conversation) -> Self {
        let (abort_handle, abort_registration) = AbortHandle::new_pair();
        Self {
            inner: Abortable::new(inner, abort_registration),
            abort_handle,
            conversation,
            accumulator: StreamAccumulator::new(),
            state: StreamState::Streaming,
            message: None,
        }
    }

    /// Cancel the stream. The next poll stops reading from the transport and
    /// yields [CompletionError::Cancelled]; no assistant turn is appended.
    pub fn cancel(&self) {
        self.abort_handle.abort();
    }

    /// The finalized assistant message, available once the stream completed
    /// successfully.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }
}

impl Stream for CompletionStream<'_> {
    type Item = Result<String, CompletionError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let stream = self.get_mut();

        loop {
            if let StreamState::Finished = stream.state {
                return Poll::Ready(None);
            }

            match stream.inner.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) => {
                    stream.accumulator.absorb(&chunk);
                    match chunk {
                        StreamChunk::TextDelta(text) => {
                            return Poll::Ready(Some(Ok(text)));
                        }
                        // Function-call deltas are accumulated silently; the
                        // assembled calls surface on the finalized message.
                        StreamChunk::FunctionCallDelta { .. } => continue,
                        StreamChunk::Done => {
                            stream.state = StreamState::Finished;
                            let accumulator = std::mem::take(&mut stream.accumulator);
                            match accumulator.finalize() {
                                Ok(message) => {
                                    stream.conversation.push_assistant(message.clone());
                                    stream.message = Some(message);
                                    return Poll::Ready(None);
                                }
                                Err(e) => return Poll::Ready(Some(Err(e))),
                            }
                        }
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    stream.state = StreamState::Finished;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    stream.state = StreamState::Finished;
                    let error = if stream.abort_handle.is_aborted() {
                        CompletionError::Cancelled
                    } else {
                        // A legitimate completion always terminates with an
                        // explicit Done chunk.
                        CompletionError::UnexpectedEndOfStream
                    };
                    return Poll::Ready(Some(Err(error)));
                }
            }
        }
    }
}

impl CompletionStream<'_> {
    /// Drive the stream to completion, discarding intermediate fragments, and
    /// return the finalized assistant message.
    pub async fn collect_message(mut self) -> Result<Message, CompletionError> {
        while let Some(fragment) = self.next().await {
            fragment?;
        }
        self.message.ok_or(CompletionError::UnexpectedEndOfStream)
    }
}
