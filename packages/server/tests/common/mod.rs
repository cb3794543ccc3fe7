//! Shared helpers for the integration tests.
//!
//! The server runs in-process on an ephemeral port and is driven through real
//! WebSocket (`tokio-tungstenite`) and HTTP (`reqwest`) clients.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use banter_server::{
    domain::{AuthStrategy, Authenticator, MessageStore},
    infrastructure::{
        auth::{PrincipalDirectory, QueryTokenStrategy, SessionCookieStrategy},
        message_pusher::BroadcastEngine,
        repository::{InMemoryMessageStore, InMemoryRoomRegistry},
    },
    ui::Server,
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, GetHistoryUseCase, GetRoomsUseCase,
        SendMessageUseCase,
    },
};
use banter_shared::time::{Clock, SystemClock};
use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::oneshot};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        self,
        client::IntoClientRequest,
        http::{HeaderValue, StatusCode, header},
    },
};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const PRINCIPALS_JSON: &str = r#"{
    "principals": [
        { "id": 1, "name": "alice", "roles": ["USER"], "tokens": ["alice-token"] },
        { "id": 2, "name": "bob", "roles": ["USER"], "tokens": ["bob-token"] },
        {
            "id": 9,
            "name": "shop",
            "roles": ["USER", "ADMIN"],
            "avatar": "https://cdn.example.com/shop.png",
            "tokens": ["shop-token"],
            "sessions": ["shop-session"]
        }
    ]
}"#;

const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Helper struct to manage an in-process server
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a server on an ephemeral port with the test principals
    pub async fn start() -> Self {
        Self::start_with_history_limit(50).await
    }

    pub async fn start_with_history_limit(history_limit: usize) -> Self {
        Self::start_with(history_limit, 64).await
    }

    pub async fn start_with_outbound_buffer(outbound_buffer: usize) -> Self {
        Self::start_with(50, outbound_buffer).await
    }

    async fn start_with(history_limit: usize, outbound_buffer: usize) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let directory = Arc::new(PrincipalDirectory::from_json(PRINCIPALS_JSON).unwrap());
        let store: Arc<dyn MessageStore> = Arc::new(InMemoryMessageStore::new(clock.clone()));
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let message_pusher = Arc::new(BroadcastEngine::new(registry.clone()));
        let strategies: Vec<Arc<dyn AuthStrategy>> = vec![
            Arc::new(QueryTokenStrategy::new(directory.clone())),
            Arc::new(SessionCookieStrategy::new(directory)),
        ];
        let authenticator = Arc::new(Authenticator::new(strategies));

        let server = Server::new(
            Arc::new(ConnectSessionUseCase::new(
                authenticator.clone(),
                registry.clone(),
                store.clone(),
                message_pusher.clone(),
                clock.clone(),
                history_limit,
                outbound_buffer,
            )),
            Arc::new(DisconnectSessionUseCase::new(
                registry.clone(),
                message_pusher.clone(),
                clock,
            )),
            Arc::new(SendMessageUseCase::new(store.clone(), message_pusher)),
            Arc::new(GetHistoryUseCase::new(store, history_limit)),
            Arc::new(GetRoomsUseCase::new(registry)),
            authenticator,
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async move {
                let _ = rx.await;
            };
            server.serve(listener, shutdown).await.unwrap();
        });

        TestServer {
            addr,
            shutdown: Some(tx),
        }
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connect to `room` with a bearer token in the query string
    pub async fn connect(&self, room: &str, token: &str) -> WsClient {
        let url = self.ws_url(&format!("/ws/chat/{room}?token={token}"));
        let (ws, _) = connect_async(url).await.unwrap();
        ws
    }

    /// Connect to `room` with a server-side session cookie
    pub async fn connect_with_cookie(&self, room: &str, session: &str) -> WsClient {
        let mut request = self
            .ws_url(&format!("/ws/chat/{room}"))
            .into_client_request()
            .unwrap();
        request.headers_mut().insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("BANTER_SESSION={session}")).unwrap(),
        );
        let (ws, _) = connect_async(request).await.unwrap();
        ws
    }

    /// Try to connect and return the HTTP status of the refused handshake
    pub async fn refused_status(&self, path: &str) -> StatusCode {
        match connect_async(self.ws_url(path)).await {
            Ok(_) => panic!("handshake to '{path}' should have been refused"),
            Err(tungstenite::Error::Http(response)) => response.status(),
            Err(e) => panic!("unexpected handshake error: {e}"),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Stop the server when the test ends
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Next text frame from the server, parsed as JSON
pub async fn next_frame(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(FRAME_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
            .expect("websocket error");
        if let tungstenite::Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Send a chat submission
pub async fn send_json(ws: &mut WsClient, submission: serde_json::Value) {
    ws.send(tungstenite::Message::Text(submission.to_string().into()))
        .await
        .unwrap();
}

/// Assert that no frame arrives within a short grace period
pub async fn assert_silent(ws: &mut WsClient) {
    let result = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(result.is_err(), "unexpected frame: {:?}", result);
}
