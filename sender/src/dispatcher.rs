//! Greedy packing of an ordered message sequence into transport batches.

use std::collections::VecDeque;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::message::Message;
use crate::transport::{MessageBatch, Transport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub messages: usize,
    pub batches: usize,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The message did not fit into a freshly opened, empty batch.
    #[error("message {position} of {total} exceeds capacity")]
    MessageTooLarge { position: usize, total: usize },

    #[error("failed to {stage} batch {batch}")]
    Transport {
        stage: &'static str,
        batch: usize,
        #[source]
        source: anyhow::Error,
    },
}

/// Send every message exactly once, in order, filling each batch before opening the next.
///
/// Batches already submitted stay submitted when a later step fails.
pub async fn dispatch<T, I>(transport: &T, messages: I) -> Result<DispatchSummary, DispatchError>
where
    T: Transport,
    I: IntoIterator<Item = Message>,
{
    let mut pending: VecDeque<Message> = messages.into_iter().collect();
    let total = pending.len();
    let mut summary = DispatchSummary::default();

    while let Some(first) = pending.front() {
        let batch_no = summary.batches + 1;
        let mut batch = transport
            .open_batch()
            .await
            .map_err(|source| DispatchError::Transport {
                stage: "open",
                batch: batch_no,
                source,
            })?;

        if !batch.try_add(first) {
            return Err(DispatchError::MessageTooLarge {
                position: total - pending.len() + 1,
                total,
            });
        }
        pending.pop_front();

        while let Some(next) = pending.front() {
            if !batch.try_add(next) {
                break;
            }
            pending.pop_front();
        }

        let size = batch.len();
        transport
            .submit(batch)
            .await
            .map_err(|source| DispatchError::Transport {
                stage: "submit",
                batch: batch_no,
                source,
            })?;

        summary.batches = batch_no;
        summary.messages += size;
        debug!(
            batch = batch_no,
            size,
            remaining = pending.len(),
            "batch submitted"
        );
    }

    Ok(summary)
}

/// [`dispatch`], then close the transport whatever the outcome.
pub async fn run<T, I>(transport: &T, messages: I) -> anyhow::Result<DispatchSummary>
where
    T: Transport,
    I: IntoIterator<Item = Message>,
{
    let outcome = dispatch(transport, messages).await;
    let closed = transport.close().await;

    match (outcome, closed) {
        (Ok(summary), Ok(())) => {
            info!(
                messages = summary.messages,
                batches = summary.batches,
                "dispatch complete"
            );
            Ok(summary)
        }
        (Ok(_), Err(e)) => Err(e.context("closing transport")),
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                warn!(error = %close_err, "closing transport after failed dispatch");
            }
            Err(e.into())
        }
    }
}
