//! Serves the real router on a loopback port and talks to it over WebSocket.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, timeout_at, Instant};
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use triplane_server::app::AppState;
use triplane_server::config::Config;
use triplane_server::game::{ConnectionId, Plane};
use triplane_server::http::build_router;
use triplane_server::util::rate_limit::CHAT_RATE_LIMIT;
use triplane_server::ws::protocol::{ChatMessage, ServerMsg};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve() -> SocketAddr {
    let config = Config {
        world_seed: Some(11),
        ..Config::default()
    };
    let (state, simulation) = AppState::new(config);
    tokio::spawn(simulation.run());

    let listener = assert_ok!(TcpListener::bind("127.0.0.1:0").await);
    let addr = assert_ok!(listener.local_addr());
    tokio::spawn(async move { axum::serve(listener, build_router(state)).await });
    addr
}

/// Read frames until `select` picks one out
async fn next_matching<T, F>(ws: &mut Client, mut select: F) -> T
where
    F: FnMut(ServerMsg) -> Option<T>,
{
    let result = timeout(Duration::from_secs(5), async {
        loop {
            let msg = match ws.next().await {
                Some(Ok(msg)) => msg,
                other => panic!("connection ended: {other:?}"),
            };
            if !msg.is_text() {
                continue;
            }
            let text = assert_ok!(msg.to_text());
            let server_msg: ServerMsg = assert_ok!(serde_json::from_str(text));
            if let Some(found) = select(server_msg) {
                return found;
            }
        }
    })
    .await;
    result.expect("timed out waiting for server message")
}

async fn connect(addr: SocketAddr) -> (Client, ConnectionId) {
    let (mut ws, _) = assert_ok!(connect_async(format!("ws://{addr}/ws")).await);
    let id = next_matching(&mut ws, |msg| match msg {
        ServerMsg::Welcome { connection_id, .. } => Some(connection_id),
        _ => None,
    })
    .await;
    (ws, id)
}

async fn send_json(ws: &mut Client, value: serde_json::Value) {
    assert_ok!(ws.send(Message::text(value.to_string())).await);
}

async fn plane_where<F>(ws: &mut Client, id: ConnectionId, pred: F) -> Plane
where
    F: Fn(&Plane) -> bool,
{
    next_matching(ws, |msg| match msg {
        ServerMsg::Update(snapshot) => snapshot.airplanes.get(&id).filter(|p| pred(*p)).cloned(),
        _ => None,
    })
    .await
}

#[tokio::test]
async fn welcomed_connection_gets_a_plane() {
    let addr = serve().await;
    let (mut ws, id) = connect(addr).await;

    let plane = plane_where(&mut ws, id, |_| true).await;
    assert!(plane.is_thrusting);
    assert!(!plane.is_firing);
    assert_eq!(plane.score, 0);
}

#[tokio::test]
async fn unknown_control_leaves_plane_untouched() {
    let addr = serve().await;
    let (mut ws, id) = connect(addr).await;

    send_json(&mut ws, json!({"event": "control", "data": "fire"})).await;
    let firing = plane_where(&mut ws, id, |p| p.is_firing).await;

    // Any command that reached the plane would clear the fire flag
    send_json(&mut ws, json!({"event": "control", "data": "barrelRoll"})).await;
    send_json(&mut ws, json!({"event": "control", "data": 42})).await;
    send_json(&mut ws, json!({"event": "loop", "data": "up"})).await;

    // Chat is handled after the bad frames on the same reader
    let chat = ChatMessage {
        user_id: "ace".to_string(),
        text: "marker".to_string(),
    };
    send_json(
        &mut ws,
        json!({"event": "chat message", "data": {"userId": "ace", "text": "marker"}}),
    )
    .await;
    next_matching(&mut ws, |msg| match msg {
        ServerMsg::ChatMessage(received) if received == chat => Some(()),
        _ => None,
    })
    .await;

    for _ in 0..4 {
        plane_where(&mut ws, id, |_| true).await;
    }
    let latest = plane_where(&mut ws, id, |_| true).await;
    assert!(latest.is_firing);
    assert!(latest.is_thrusting);
    assert_eq!(latest.angle, firing.angle);
    assert_eq!(latest.color, firing.color);
}

#[tokio::test]
async fn chat_is_relayed_to_every_connection_including_sender() {
    let addr = serve().await;
    let (mut sender, _) = connect(addr).await;
    let (mut other, _) = connect(addr).await;

    send_json(
        &mut sender,
        json!({"event": "chat message", "data": {"userId": "u", "text": "hi"}}),
    )
    .await;

    let expected = ChatMessage {
        user_id: "u".to_string(),
        text: "hi".to_string(),
    };
    for ws in [&mut sender, &mut other] {
        let received = next_matching(ws, |msg| match msg {
            ServerMsg::ChatMessage(chat) => Some(chat),
            _ => None,
        })
        .await;
        assert_eq!(received, expected);
    }
}

#[tokio::test]
async fn chat_burst_is_rate_limited() {
    let addr = serve().await;
    let (mut ws, _) = connect(addr).await;

    for i in 0..(CHAT_RATE_LIMIT * 2) {
        let text = format!("burst-{i}");
        send_json(
            &mut ws,
            json!({"event": "chat message", "data": {"userId": "spam", "text": text}}),
        )
        .await;
    }

    let deadline = Instant::now() + Duration::from_millis(500);
    let mut relayed = 0;
    while let Ok(Some(Ok(msg))) = timeout_at(deadline, ws.next()).await {
        if !msg.is_text() {
            continue;
        }
        if let Ok(ServerMsg::ChatMessage(chat)) = serde_json::from_str(assert_ok!(msg.to_text())) {
            assert!(chat.text.starts_with("burst-"));
            relayed += 1;
        }
    }

    assert!(relayed >= 1, "no chat relayed");
    assert!(relayed <= CHAT_RATE_LIMIT, "relayed {relayed} chats in one burst");
}

#[tokio::test]
async fn closed_and_dropped_connections_lose_their_planes() {
    let addr = serve().await;
    let (mut observer, _) = connect(addr).await;

    let (mut closing, closing_id) = connect(addr).await;
    let (dropping, dropping_id) = connect(addr).await;

    next_matching(&mut observer, |msg| match msg {
        ServerMsg::Update(s)
            if s.airplanes.contains_key(&closing_id) && s.airplanes.contains_key(&dropping_id) =>
        {
            Some(())
        }
        _ => None,
    })
    .await;

    // Close frame
    assert_ok!(closing.close(None).await);
    next_matching(&mut observer, |msg| match msg {
        ServerMsg::Update(s) if !s.airplanes.contains_key(&closing_id) => Some(()),
        _ => None,
    })
    .await;

    // Stream end without a close frame
    drop(dropping);
    next_matching(&mut observer, |msg| match msg {
        ServerMsg::Update(s) if !s.airplanes.contains_key(&dropping_id) => Some(()),
        _ => None,
    })
    .await;

    // Gone for good
    for _ in 0..3 {
        next_matching(&mut observer, |msg| match msg {
            ServerMsg::Update(s) => {
                assert!(!s.airplanes.contains_key(&closing_id));
                assert!(!s.airplanes.contains_key(&dropping_id));
                Some(())
            }
            _ => None,
        })
        .await;
    }
}
