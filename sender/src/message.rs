//! Generation of the numbered text messages pushed by `sbsend`.

use std::fmt;

use chrono::{DateTime, Local};

/// Timestamp layout appended to every generated body.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// An immutable text payload. Identity is its position in the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    body: String,
}

impl Message {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    /// Body size in bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

/// Build `count` messages stamped with the local wall clock.
pub fn generate(count: u32, prefix: &str) -> Vec<Message> {
    generate_with(count, prefix, Local::now)
}

/// Build `count` messages as `<prefix> msg <i>/<count> <timestamp>`, i = 1..=count.
///
/// `clock` is read once per message, in order.
pub fn generate_with<F>(count: u32, prefix: &str, mut clock: F) -> Vec<Message>
where
    F: FnMut() -> DateTime<Local>,
{
    (1..=count)
        .map(|i| {
            let stamp = clock().format(TIMESTAMP_FORMAT);
            Message::new(format!("{prefix} msg {i}/{count} {stamp}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap()
    }

    #[test]
    fn generates_exactly_count_messages_in_order() {
        let msgs = generate_with(3, "hoge", fixed);
        let bodies: Vec<_> = msgs.iter().map(Message::as_str).collect();
        assert_eq!(
            bodies,
            vec![
                "hoge msg 1/3 2024/03/09 07:05:01",
                "hoge msg 2/3 2024/03/09 07:05:01",
                "hoge msg 3/3 2024/03/09 07:05:01",
            ]
        );
    }

    #[test]
    fn zero_count_yields_nothing() {
        assert!(generate(0, "x").is_empty());
    }

    #[test]
    fn empty_prefix_keeps_leading_space() {
        let msgs = generate_with(1, "", fixed);
        assert_eq!(msgs[0].as_str(), " msg 1/1 2024/03/09 07:05:01");
    }

    #[test]
    fn clock_is_read_once_per_message() {
        let mut reads = 0;
        let msgs = generate_with(4, "p", || {
            reads += 1;
            fixed()
        });
        assert_eq!(msgs.len(), 4);
        assert_eq!(reads, 4);
    }

    #[test]
    fn every_body_carries_index_and_total() {
        let msgs = generate(25, "load");
        for (i, m) in msgs.iter().enumerate() {
            assert!(m.as_str().starts_with(&format!("load msg {}/25 ", i + 1)));
        }
    }
}
