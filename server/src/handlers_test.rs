use std::path::PathBuf;

use driftboard_shared::{BrushStyle, Point, StrokeSegment};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::*;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn segment(x0: f32, y0: f32, x1: f32, y1: f32) -> StrokeSegment {
    StrokeSegment::new(
        Point::new(x0, y0),
        Point::new(x1, y1),
        "#000000",
        2.0,
        1.0,
        BrushStyle::Round,
    )
}

async fn spawn_server() -> String {
    let state = AppState::new(PathBuf::from("missing/index.html"));
    let app = crate::router(state, PathBuf::from("missing"));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("ws://{addr}/ws")
}

async fn connect(url: &str) -> Client {
    let (client, _) = connect_async(url).await.expect("ws connect");
    client
}

async fn send_draw(client: &mut Client, segment: &StrokeSegment) {
    let text = serde_json::to_string(&ClientMessage::Draw(segment.clone())).unwrap();
    client.send(WsMessage::Text(text)).await.unwrap();
}

async fn recv(client: &mut Client) -> ServerMessage {
    loop {
        let frame = timeout(Duration::from_secs(2), client.next())
            .await
            .expect("receive timed out")
            .expect("stream ended")
            .expect("ws error");
        if let WsMessage::Text(text) = frame {
            return serde_json::from_str(&text).expect("server message");
        }
    }
}

async fn recv_history(client: &mut Client) -> Vec<StrokeSegment> {
    match recv(client).await {
        ServerMessage::LoadDrawings { segments } => segments,
        other => panic!("expected loadDrawings, got {other:?}"),
    }
}

async fn recv_draw(client: &mut Client) -> StrokeSegment {
    match recv(client).await {
        ServerMessage::Draw(segment) => segment,
        other => panic!("expected draw, got {other:?}"),
    }
}

async fn assert_silent(client: &mut Client) {
    let result = timeout(Duration::from_millis(200), client.next()).await;
    assert!(result.is_err(), "unexpected frame: {result:?}");
}

#[tokio::test]
async fn peer_receives_exact_draw_and_sender_gets_no_echo() {
    let url = spawn_server().await;
    let mut a = connect(&url).await;
    let mut b = connect(&url).await;
    assert!(recv_history(&mut a).await.is_empty());
    assert!(recv_history(&mut b).await.is_empty());

    let stroke = segment(10.0, 10.0, 20.0, 20.0);
    send_draw(&mut a, &stroke).await;

    assert_eq!(recv_draw(&mut b).await, stroke);
    assert_silent(&mut a).await;
}

#[tokio::test]
async fn late_joiner_replays_prior_segments_in_order() {
    let url = spawn_server().await;
    let mut a = connect(&url).await;
    let mut b = connect(&url).await;
    recv_history(&mut a).await;
    recv_history(&mut b).await;

    let strokes = (0..5)
        .map(|i| segment(i as f32, 0.0, i as f32 + 1.0, 1.0))
        .collect::<Vec<_>>();
    for stroke in &strokes {
        send_draw(&mut a, stroke).await;
    }
    // b observing all five means the hub has appended all five.
    for stroke in &strokes {
        assert_eq!(&recv_draw(&mut b).await, stroke);
    }

    let mut late = connect(&url).await;
    assert_eq!(recv_history(&mut late).await, strokes);

    let live = segment(50.0, 50.0, 60.0, 60.0);
    send_draw(&mut a, &live).await;
    assert_eq!(recv_draw(&mut late).await, live);
}

#[tokio::test]
async fn rejected_and_malformed_frames_are_dropped_without_closing() {
    let url = spawn_server().await;
    let mut a = connect(&url).await;
    let mut b = connect(&url).await;
    recv_history(&mut a).await;
    recv_history(&mut b).await;

    let mut too_opaque = segment(0.0, 0.0, 1.0, 1.0);
    too_opaque.opacity = 1.5;
    send_draw(&mut a, &too_opaque).await;
    let mut zero_width = segment(0.0, 0.0, 1.0, 1.0);
    zero_width.size = 0.0;
    send_draw(&mut a, &zero_width).await;
    a.send(WsMessage::Text("{\"type\":\"draw\",\"x0\":1}".into()))
        .await
        .unwrap();

    let mut accepted = segment(5.0, 5.0, 6.0, 6.0);
    accepted.opacity = 0.5;
    accepted.size = 3.0;
    send_draw(&mut a, &accepted).await;

    assert_eq!(recv_draw(&mut b).await, accepted);

    let mut late = connect(&url).await;
    assert_eq!(recv_history(&mut late).await, vec![accepted]);
}

#[tokio::test]
async fn binary_frames_are_accepted() {
    let url = spawn_server().await;
    let mut a = connect(&url).await;
    let mut b = connect(&url).await;
    recv_history(&mut a).await;
    recv_history(&mut b).await;

    let stroke = segment(1.0, 2.0, 3.0, 4.0);
    let bytes =
        bincode::encode_to_vec(ClientMessage::Draw(stroke.clone()), bincode::config::standard())
            .unwrap();
    a.send(WsMessage::Binary(bytes)).await.unwrap();

    assert_eq!(recv_draw(&mut b).await, stroke);
}

#[tokio::test]
async fn connection_walks_its_lifecycle() {
    let hub = Arc::new(Hub::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut connection = Connection::new(DEFAULT_SESSION.to_string(), hub.clone(), tx);
    assert_eq!(connection.state(), ConnectionState::Connecting);

    connection
        .dispatch(ClientMessage::Draw(segment(0.0, 0.0, 1.0, 1.0)))
        .await;
    assert!(hub.history().await.is_empty());

    assert!(connection.open().await);
    assert_eq!(connection.state(), ConnectionState::Connected);
    assert!(matches!(
        rx.try_recv(),
        Ok(ServerMessage::LoadDrawings { .. })
    ));
    assert!(!connection.open().await);

    connection
        .dispatch(ClientMessage::Draw(segment(0.0, 0.0, 1.0, 1.0)))
        .await;
    assert_eq!(hub.history().await.len(), 1);

    connection.close().await;
    connection.close().await;
    assert_eq!(connection.state(), ConnectionState::Disconnected);
    assert_eq!(hub.peer_count().await, 0);
}
