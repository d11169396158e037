//! In-process transport with configurable capacity, used to exercise the
//! dispatcher without a queue service.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, anyhow};

use super::{MessageBatch, Transport};
use crate::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    /// Total body bytes a batch may hold.
    pub max_bytes: usize,
    /// Number of messages a batch may hold.
    pub max_messages: usize,
}

impl Capacity {
    pub const fn bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            max_messages: usize::MAX,
        }
    }

    pub const fn messages(max_messages: usize) -> Self {
        Self {
            max_bytes: usize::MAX,
            max_messages,
        }
    }
}

#[derive(Debug)]
pub struct MemoryBatch {
    capacity: Capacity,
    bytes: usize,
    messages: Vec<Message>,
}

impl MemoryBatch {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

impl MessageBatch for MemoryBatch {
    fn try_add(&mut self, message: &Message) -> bool {
        if self.messages.len() >= self.capacity.max_messages {
            return false;
        }
        match self.bytes.checked_add(message.len()) {
            Some(total) if total <= self.capacity.max_bytes => {
                self.bytes = total;
                self.messages.push(message.clone());
                true
            }
            _ => false,
        }
    }

    fn len(&self) -> usize {
        self.messages.len()
    }
}

/// Records every submitted batch in submission order.
#[derive(Debug)]
pub struct MemoryTransport {
    capacity: Capacity,
    fail_submit_at: Option<usize>,
    opened: AtomicUsize,
    attempts: AtomicUsize,
    submitted: Mutex<Vec<Vec<Message>>>,
    closed: AtomicBool,
}

impl MemoryTransport {
    pub fn new(capacity: Capacity) -> Self {
        Self {
            capacity,
            fail_submit_at: None,
            opened: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Make the `n`-th submission (1-based) fail instead of being recorded.
    pub fn fail_submit_at(mut self, n: usize) -> Self {
        self.fail_submit_at = Some(n);
        self
    }

    pub fn batches(&self) -> Vec<Vec<Message>> {
        self.submitted
            .lock()
            .map(|b| b.clone())
            .unwrap_or_default()
    }

    /// All delivered messages, flattened in delivery order.
    pub fn delivered(&self) -> Vec<Message> {
        self.batches().into_iter().flatten().collect()
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Transport for MemoryTransport {
    type Batch = MemoryBatch;

    async fn open_batch(&self) -> Result<MemoryBatch> {
        if self.is_closed() {
            return Err(anyhow!("transport is closed"));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryBatch {
            capacity: self.capacity,
            bytes: 0,
            messages: Vec::new(),
        })
    }

    async fn submit(&self, batch: MemoryBatch) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_submit_at == Some(attempt) {
            return Err(anyhow!("simulated failure on submission {attempt}"));
        }
        self.submitted
            .lock()
            .map_err(|_| anyhow!("submission log poisoned"))?
            .push(batch.messages);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_add_leaves_batch_untouched() {
        let mut batch = MemoryBatch {
            capacity: Capacity::bytes(10),
            bytes: 0,
            messages: Vec::new(),
        };
        assert!(batch.try_add(&Message::new("123456")));
        assert!(!batch.try_add(&Message::new("12345")));
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.bytes, 6);
        assert!(batch.try_add(&Message::new("1234")));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn message_limit_is_enforced() {
        let mut batch = MemoryBatch {
            capacity: Capacity::messages(2),
            bytes: 0,
            messages: Vec::new(),
        };
        assert!(batch.try_add(&Message::new("a")));
        assert!(batch.try_add(&Message::new("b")));
        assert!(!batch.try_add(&Message::new("c")));
        assert_eq!(batch.messages().len(), 2);
    }

    #[tokio::test]
    async fn scheduled_failure_skips_recording() {
        let transport = MemoryTransport::new(Capacity::messages(1)).fail_submit_at(2);
        for body in ["one", "two", "three"] {
            let mut batch = transport.open_batch().await.unwrap();
            assert!(batch.try_add(&Message::new(body)));
            let outcome = transport.submit(batch).await;
            assert_eq!(outcome.is_err(), body == "two");
        }
        let delivered: Vec<_> = transport.delivered().into_iter().map(Message::into_body).collect();
        assert_eq!(delivered, vec!["one", "three"]);
    }

    #[tokio::test]
    async fn closed_transport_refuses_new_batches() {
        let transport = MemoryTransport::new(Capacity::bytes(8));
        transport.close().await.unwrap();
        assert!(transport.is_closed());
        assert!(transport.open_batch().await.is_err());
    }
}
