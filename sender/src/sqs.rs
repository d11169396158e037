use anyhow::{Context, Result, anyhow};
use aws_sdk_sqs::Client;
use aws_sdk_sqs::types::SendMessageBatchRequestEntry;
use tracing::debug;

use crate::message::Message;
use crate::transport::{MessageBatch, Transport};

/// https://docs.aws.amazon.com/AWSSimpleQueueService/latest/APIReference/API_SendMessageBatch.html
pub const MAX_BATCH_ENTRIES: usize = 10;
/// Sum of all body sizes in one SendMessageBatch request: the classic 256 KiB
/// quota. AWS SQS now accepts up to 1 MiB, but LocalStack and other
/// SQS-compatible endpoints still enforce 256 KiB, so bodies between the two
/// limits are refused here rather than by the service.
pub const MAX_BATCH_BYTES: usize = 262_144;

pub async fn get_queue_url(client: &Client, queue_name: &str) -> Result<String> {
    let out = client
        .get_queue_url()
        .queue_name(queue_name)
        .send()
        .await
        .with_context(|| format!("getting queue url for {queue_name}"))?;

    out.queue_url()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("queue url missing in response"))
}

/// Entries for one SendMessageBatch call.
#[derive(Debug, Default)]
pub struct SqsBatch {
    bodies: Vec<String>,
    bytes: usize,
}

impl SqsBatch {
    fn entries(self) -> Result<Vec<SendMessageBatchRequestEntry>> {
        self.bodies
            .into_iter()
            .enumerate()
            .map(|(i, body)| {
                SendMessageBatchRequestEntry::builder()
                    .id(i.to_string())
                    .message_body(body)
                    .build()
                    .context("building batch entry")
            })
            .collect()
    }
}

impl MessageBatch for SqsBatch {
    fn try_add(&mut self, message: &Message) -> bool {
        if self.bodies.len() >= MAX_BATCH_ENTRIES {
            return false;
        }
        let total = self.bytes + message.len();
        if total > MAX_BATCH_BYTES {
            return false;
        }
        self.bytes = total;
        self.bodies.push(message.as_str().to_owned());
        true
    }

    fn len(&self) -> usize {
        self.bodies.len()
    }
}

pub struct SqsTransport {
    client: Client,
    queue_url: String,
}

impl SqsTransport {
    pub fn new(client: Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

impl Transport for SqsTransport {
    type Batch = SqsBatch;

    async fn open_batch(&self) -> Result<SqsBatch> {
        Ok(SqsBatch::default())
    }

    async fn submit(&self, batch: SqsBatch) -> Result<()> {
        let size = batch.len();
        let out = self
            .client
            .send_message_batch()
            .queue_url(&self.queue_url)
            .set_entries(Some(batch.entries()?))
            .send()
            .await
            .with_context(|| format!("sending batch of {size} to {}", self.queue_url))?;

        // SQS accepts the request even when individual entries are rejected.
        if let Some(f) = out.failed().first() {
            return Err(anyhow!(
                "{} of {size} entries rejected; entry {}: {} ({})",
                out.failed().len(),
                f.id(),
                f.message().unwrap_or("no message"),
                f.code()
            ));
        }

        debug!(entries = out.successful().len(), "SendMessageBatch ok");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // The SDK client holds no session; dropping it releases the connection pool.
        debug!(queue_url = %self.queue_url, "closing SQS transport");
        Ok(())
    }
}
