//! Concurrent callers and event delivery.
use std::time::{Duration, Instant};

use blaze_common::error;
use blaze_common::event::node::NodeEvent;
use blaze_common::event::session::SessionEvent;
use blaze_common::event::Event;
use blaze_common::handler::Handler;
use blaze_common::model::request::{CreateInvoice, PayInvoice};
use blaze_common::types::SessionState;
use blaze_session::errors::{ConnectError, InvoiceError};
use blaze_testing::{Call, MockBackend};

use crate::{init, session};

const CERT: &[u8] = b"certificate";

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_listener_does_not_hold_the_backend() -> error::Result<()> {
    init();
    const EVENTS: u32 = 50;
    let backend = MockBackend::new();
    backend.script(|script| {
        script.events_per_call = (0..EVENTS)
            .map(|height| NodeEvent::NewBlock { height })
            .collect()
    });
    let (session, _dir) = session(&backend)?;
    let events = session.events();

    // the listener needs a full second to drain the burst
    let listener = std::thread::spawn(move || {
        let mut seen = 0;
        while let Ok(event) = events.recv_timeout(Duration::from_secs(10)) {
            if let Event::Node(NodeEvent::NewBlock { .. }) = event {
                std::thread::sleep(Duration::from_millis(20));
                seen += 1;
                if seen == EVENTS {
                    break;
                }
            }
        }
        seen
    });

    session.connect(CERT).await?;
    let started = Instant::now();
    session
        .pay_invoice(&PayInvoice {
            bolt11: "lnbc1...".to_owned(),
        })
        .await?;
    let elapsed = started.elapsed();
    assert!(
        elapsed < Duration::from_millis(500),
        "the backend call was held for {elapsed:?}"
    );

    let seen = listener.join().expect("listener thread panicked");
    assert_eq!(seen, EVENTS);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_connects_open_a_single_session() -> error::Result<()> {
    init();
    let backend = MockBackend::new();
    let (session, _dir) = session(&backend)?;

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let session = session.clone();
        tasks.push(tokio::spawn(async move { session.connect(CERT).await }));
    }
    let mut connected = 0;
    for task in tasks {
        match task.await? {
            Ok(()) => connected += 1,
            Err(err) => assert_eq!(err, ConnectError::AlreadyConnected),
        }
    }
    assert_eq!(connected, 1);
    assert_eq!(backend.count(|call| matches!(call, Call::Connect { .. })), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disconnect_waits_for_in_flight_calls() -> error::Result<()> {
    init();
    let backend = MockBackend::new();
    backend.script(|script| script.latency = Some(Duration::from_millis(10)));
    let (session, _dir) = session(&backend)?;
    session.connect(CERT).await?;

    let mut tasks = Vec::new();
    for amount in 1..=20 {
        let session = session.clone();
        tasks.push(tokio::spawn(async move {
            session
                .create_invoice(&CreateInvoice::new(amount, "race"))
                .await
        }));
    }
    tokio::time::sleep(Duration::from_millis(5)).await;
    session.disconnect().await;

    let mut created = 0;
    for task in tasks {
        match task.await? {
            Ok(_) => created += 1,
            Err(err) => assert_eq!(err, InvoiceError::NotConnected),
        }
    }
    assert_eq!(session.state().await, SessionState::Disconnected);
    // every call that reached the backend completed with a result
    assert_eq!(
        backend.count(|call| matches!(call, Call::ReceivePayment { .. })),
        created
    );
    // and none of them ran after the teardown
    let calls = backend.calls();
    let teardown = calls
        .iter()
        .position(|call| *call == Call::Disconnect)
        .expect("disconnect reached the backend");
    assert!(calls[teardown..]
        .iter()
        .all(|call| !matches!(call, Call::ReceivePayment { .. })));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_queries_share_the_session() -> error::Result<()> {
    init();
    let backend = MockBackend::new();
    backend.script(|script| script.latency = Some(Duration::from_millis(200)));
    let (session, _dir) = session(&backend)?;
    session.connect(CERT).await?;

    let started = Instant::now();
    let (first, second, third) = tokio::join!(
        session.node_info(),
        session.node_info(),
        session.list_payments()
    );
    first?;
    second?;
    third?;
    // three serialized calls would take at least 600ms
    assert!(started.elapsed() < Duration::from_millis(550));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lifecycle_events_follow_the_state_order() -> error::Result<()> {
    init();
    let backend = MockBackend::new();
    let (session, _dir) = session(&backend)?;
    let events = session.events();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let session = session.clone();
        tasks.push(tokio::spawn(async move {
            let mut connected = 0;
            for _ in 0..25 {
                if session.connect(CERT).await.is_ok() {
                    connected += 1;
                }
                session.disconnect().await;
            }
            connected
        }));
    }
    let mut connected = 0;
    for task in tasks {
        connected += task.await?;
    }

    let mut expect_connected = true;
    let mut seen = 0;
    while let Ok(event) = events.try_recv() {
        let Event::Session(event) = event else {
            continue;
        };
        let is_connected = matches!(event, SessionEvent::Connected { .. });
        assert_eq!(is_connected, expect_connected, "out of order {event:?}");
        expect_connected = !expect_connected;
        seen += 1;
    }
    assert_eq!(seen, connected * 2);
    assert_eq!(session.state().await, SessionState::Disconnected);
    Ok(())
}
