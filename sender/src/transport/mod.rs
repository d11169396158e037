//! The seam between the dispatcher and whatever queue service receives the batches.
//!
//! The dispatcher never estimates sizes itself: the transport decides what fits.

pub mod memory;

use anyhow::Result;

use crate::message::Message;

/// A provider-bounded container filled by the dispatcher and then submitted.
pub trait MessageBatch {
    /// Add `message` if it fits. A `false` return leaves the batch unchanged.
    fn try_add(&mut self, message: &Message) -> bool;

    /// Number of messages accepted so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A connection to one destination queue.
#[allow(async_fn_in_trait)]
pub trait Transport {
    type Batch: MessageBatch;

    /// Start an empty batch with provider-determined capacity.
    async fn open_batch(&self) -> Result<Self::Batch>;

    /// Deliver a batch as one provider-level operation.
    async fn submit(&self, batch: Self::Batch) -> Result<()>;

    /// Release the connection. Called once per run, on success and on failure.
    async fn close(&self) -> Result<()>;
}
