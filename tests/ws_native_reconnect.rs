//! Native WebSocket client against a local `tokio-tungstenite` server.
//!
//! Run with:
//! ```bash
//! cargo test --features ws-native --test ws_native_reconnect
//! ```

#![cfg(feature = "ws-native")]

use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use coinboard::app::native::run;
use coinboard::prelude::*;

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

const BATCH: &str = r#"[
    {"id":"bitcoin","name":"Bitcoin","symbol":"btc","image":"https://img/btc.png","current_price":64000.5,"price_change_24h":1.25},
    {"id":"ethereum","name":"Ethereum","symbol":"eth","image":"https://img/eth.png","current_price":3100,"price_change_24h":null}
]"#;

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    (listener, url)
}

fn config(url: &str, reconnect_delay_ms: u32) -> WsConfig {
    WsConfig {
        url: url.to_string(),
        reconnect: true,
        reconnect_delay_ms,
    }
}

/// Hold a server-side socket open until the client goes away.
async fn drain<S>(mut ws: WebSocketStream<S>)
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    while let Some(Ok(_)) = ws.next().await {}
}

async fn next_event(client: &WsClient) -> WsEvent {
    timeout(TEST_TIMEOUT, client.next_event())
        .await
        .expect("timed out waiting for event")
        .expect("event stream ended")
}

#[tokio::test]
async fn test_delivers_batches_and_survives_malformed_frame() {
    let (listener, url) = bind().await;
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text("{not json".into())).await.unwrap();
        ws.send(Message::Text(BATCH.into())).await.unwrap();
        drain(ws).await;
    });

    let mut client = WsClient::new(config(&url, 3_000));
    client.connect().await.unwrap();

    assert_eq!(next_event(&client).await, WsEvent::Connected);
    assert!(client.is_connected());
    assert!(matches!(next_event(&client).await, WsEvent::Error(_)));

    match next_event(&client).await {
        WsEvent::Message(batch) => {
            assert_eq!(batch.len(), 2);
            assert_eq!(batch[0].id, AssetId::from("bitcoin"));
            assert_eq!(batch[1].price_change_24h, None);
        }
        other => panic!("expected Message, got {other:?}"),
    }

    // Still the same connection.
    assert!(client.is_connected());
    client.disconnect().await.unwrap();
    assert_eq!(client.ready_state(), ReadyState::Closed);
}

#[tokio::test]
async fn test_reconnects_after_fixed_delay_and_not_sooner() {
    let delay = Duration::from_millis(300);
    let (listener, url) = bind().await;
    let (closed_tx, closed_rx) = oneshot::channel::<Instant>();
    let (reaccept_tx, reaccept_rx) = oneshot::channel::<Instant>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let closed_at = Instant::now();
        ws.close(None).await.unwrap();
        closed_tx.send(closed_at).unwrap();
        drain(ws).await;

        let (stream, _) = listener.accept().await.unwrap();
        reaccept_tx.send(Instant::now()).unwrap();
        let ws = accept_async(stream).await.unwrap();
        drain(ws).await;
    });

    let mut client = WsClient::new(config(&url, delay.as_millis() as u32));
    client.connect().await.unwrap();

    assert_eq!(next_event(&client).await, WsEvent::Connected);
    assert!(matches!(
        next_event(&client).await,
        WsEvent::Disconnected { .. }
    ));
    assert_eq!(next_event(&client).await, WsEvent::Connected);

    let closed_at = closed_rx.await.unwrap();
    let reaccepted_at = reaccept_rx.await.unwrap();
    let gap = reaccepted_at.duration_since(closed_at);
    assert!(gap >= delay, "reconnected after {gap:?}, before {delay:?}");
    assert!(gap < delay + Duration::from_secs(2), "reconnect took {gap:?}");

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_failed_connect_retries_with_fixed_delay() {
    // Reserve a port, then free it so the first attempt is refused.
    let (listener, url) = bind().await;
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut client = WsClient::new(config(&url, 200));
    client.connect().await.unwrap();
    assert!(matches!(
        next_event(&client).await,
        WsEvent::ConnectFailed(_)
    ));

    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = accept_async(stream).await.unwrap();
        drain(ws).await;
    });

    // Further refusals may land before the listener is up; skip them.
    let connected = timeout(TEST_TIMEOUT, async {
        loop {
            match client.next_event().await {
                Some(WsEvent::Connected) => return true,
                Some(WsEvent::ConnectFailed(_)) => continue,
                _ => return false,
            }
        }
    })
    .await
    .expect("timed out waiting for reconnect");
    assert!(connected);

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_runner_applies_batch_then_clears_flash() {
    let (listener, url) = bind().await;
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(BATCH.into())).await.unwrap();
        drain(ws).await;
    });

    let mut dashboard = Dashboard::builder()
        .variant(Variant::Explorer)
        .ws_url(&url)
        .flash_duration(Duration::from_millis(50))
        .build()
        .unwrap();
    let mut client = WsClient::new(dashboard.config().ws.clone());

    let (done_tx, done_rx) = oneshot::channel::<()>();
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<(usize, bool)>();
    let mut done_tx = Some(done_tx);

    let on_render = |d: &Dashboard| {
        let updated = match d.grid() {
            GridView::Cards(cards) => cards.iter().any(|c| c.updated),
            _ => false,
        };
        let _ = seen_tx.send((d.count(), updated));
        if d.count() == 2 && !updated {
            if let Some(tx) = done_tx.take() {
                let _ = tx.send(());
            }
        }
    };

    timeout(
        TEST_TIMEOUT,
        run(&mut dashboard, &mut client, on_render, async {
            let _ = done_rx.await;
        }),
    )
    .await
    .expect("runner did not finish")
    .unwrap();

    assert_eq!(dashboard.count(), 2);
    assert_eq!(dashboard.status(), ConnectionStatus::Connected);

    let mut renders = Vec::new();
    while let Ok(seen) = seen_rx.try_recv() {
        renders.push(seen);
    }
    assert_eq!(renders.first(), Some(&(0, false)));
    assert!(renders.contains(&(2, true)), "batch render missing: {renders:?}");
    assert_eq!(renders.last(), Some(&(2, false)));
}
