pub mod cli;
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod logging;
pub mod message;
pub mod sqs;
pub mod transport;

pub use dispatcher::{DispatchError, DispatchSummary};
pub use message::Message;
pub use transport::{MessageBatch, Transport};
