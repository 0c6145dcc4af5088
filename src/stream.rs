//! Streaming API: yield response messages as a `Stream`.
//!
//! Plugin hosts consume an action's output as a message stream, not a
//! vector. [`invoke_stream`] wraps [`crate::invoke::invoke`] in that shape so
//! a host adapter can forward each message as soon as it is polled, e.g.
//! writing JSON lines to a pipe.
//!
//! The stream owns its request and config, so it is `'static` and can be
//! handed to another task.

use crate::config::ToolConfig;
use crate::invoke::invoke;
use crate::output::ToolMessage;
use crate::pipeline::params::ToolParameters;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::debug;

/// A boxed stream of response messages.
pub type MessageStream = Pin<Box<dyn Stream<Item = ToolMessage> + Send>>;

/// Run the plugin action, streaming its response messages.
///
/// Nothing happens until the stream is first polled. The stream yields the
/// same sequence [`invoke`] returns, then ends.
pub fn invoke_stream(params: ToolParameters, config: ToolConfig) -> MessageStream {
    let s = stream::once(async move { invoke(&params, &config).await })
        .flat_map(|messages| {
            debug!("Streaming {} messages", messages.len());
            stream::iter(messages)
        });

    Box::pin(s)
}
