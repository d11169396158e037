use sender::dispatcher::{self, DispatchError};
use sender::message::{self, Message};
use sender::transport::memory::{Capacity, MemoryTransport};

#[tokio::test]
async fn generated_run_delivers_every_message_once_in_order() {
    let messages = message::generate(23, "load");
    let transport = MemoryTransport::new(Capacity::messages(10));

    let summary = dispatcher::run(&transport, messages.clone()).await.unwrap();

    assert_eq!(summary.messages, 23);
    assert_eq!(summary.batches, 3);
    assert_eq!(transport.delivered(), messages);
    assert!(transport.is_closed());
}

#[tokio::test]
async fn zero_count_submits_no_batches() {
    let transport = MemoryTransport::new(Capacity::bytes(64));

    let summary = dispatcher::run(&transport, message::generate(0, "")).await.unwrap();

    assert_eq!(summary.batches, 0);
    assert_eq!(transport.opened(), 0);
    assert!(transport.batches().is_empty());
    assert!(transport.is_closed());
}

#[tokio::test]
async fn byte_capacity_packs_greedily() {
    // each body is 10 bytes; 35 bytes per batch holds three
    let messages: Vec<Message> = (0..8).map(|i| Message::new(format!("body-{i:05}"))).collect();
    let transport = MemoryTransport::new(Capacity::bytes(35));

    dispatcher::run(&transport, messages.clone()).await.unwrap();

    let sizes: Vec<usize> = transport.batches().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 3, 2]);
    assert_eq!(transport.delivered(), messages);
}

#[tokio::test]
async fn oversized_message_aborts_before_later_messages() {
    let mut messages = message::generate(6, "m");
    messages[4] = Message::new("x".repeat(500));
    let transport = MemoryTransport::new(Capacity::bytes(100));

    let err = dispatcher::run(&transport, messages.clone()).await.unwrap_err();

    let dispatch_err = err.downcast_ref::<DispatchError>().expect("dispatch error");
    assert_eq!(dispatch_err.to_string(), "message 5 of 6 exceeds capacity");
    assert_eq!(transport.delivered(), messages[..4].to_vec());
    assert!(transport.is_closed());
}

#[tokio::test]
async fn transport_failure_is_fatal_and_still_closes() {
    let transport = MemoryTransport::new(Capacity::messages(2)).fail_submit_at(1);

    let err = dispatcher::run(&transport, message::generate(4, "p")).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DispatchError>(),
        Some(DispatchError::Transport { stage: "submit", batch: 1, .. })
    ));
    assert!(transport.batches().is_empty());
    assert!(transport.is_closed());
}
