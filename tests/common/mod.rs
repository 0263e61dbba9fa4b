//! Shared helpers for the integration tests: an in-process axum server and a
//! reporter that keeps every outcome it sees.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use link_prober::{Outcome, Reporter};

/// Counters the `/busy` route updates so tests can see server-side concurrency.
#[derive(Default)]
pub struct ServerState {
    pub active: AtomicUsize,
    pub peak: AtomicUsize,
    pub hits: AtomicUsize,
}

pub struct MockServer {
    pub addr: SocketAddr,
    pub state: Arc<ServerState>,
}

impl MockServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn busy(State(state): State<Arc<ServerState>>) -> StatusCode {
    let now = state.active.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak.fetch_max(now, Ordering::SeqCst);
    state.hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    state.active.fetch_sub(1, Ordering::SeqCst);
    StatusCode::OK
}

async fn delay(Path(millis): Path<u64>) -> StatusCode {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    StatusCode::OK
}

async fn only_post(method: Method) -> StatusCode {
    if method == Method::POST {
        StatusCode::CREATED
    } else {
        StatusCode::METHOD_NOT_ALLOWED
    }
}

pub async fn start_server() -> MockServer {
    let state = Arc::new(ServerState::default());

    let app = Router::new()
        .route("/ok", any(|| async { StatusCode::OK }))
        .route(
            "/redirect",
            any(|| async { (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "https://b")]) }),
        )
        .route("/missing", any(|| async { StatusCode::NOT_FOUND }))
        .route("/broken", any(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/delay/{millis}", any(delay))
        .route("/only-post", any(only_post))
        .route("/busy", any(busy))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer { addr, state }
}

/// An address nothing listens on: bind a port, then release it.
pub fn refused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

#[derive(Clone, Default)]
pub struct Collector(pub Arc<Mutex<Vec<Outcome>>>);

impl Collector {
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.0.lock().unwrap().clone()
    }
}

impl Reporter for Collector {
    fn report(&mut self, outcome: &Outcome) {
        self.0.lock().unwrap().push(outcome.clone());
    }
}
