//! In-process target servers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

pub const TEN_MIB: usize = 10 * 1024 * 1024;

/// How a mock target answers `GET /test-file`.
#[derive(Clone)]
pub struct Behaviour {
    pub status: StatusCode,
    pub body: Bytes,
    pub delay: Duration,
}

impl Behaviour {
    pub fn ok(body_len: usize) -> Self {
        Self {
            status: StatusCode::OK,
            body: Bytes::from(vec![0u8; body_len]),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: Bytes::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Request counters shared with the running server.
#[derive(Default)]
pub struct Counters {
    pub hits: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl Counters {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// A running mock target.
pub struct MockTarget {
    pub addr: SocketAddr,
    pub counters: Arc<Counters>,
}

impl MockTarget {
    pub fn url(&self) -> String {
        format!("http://{}/test-file", self.addr)
    }
}

#[derive(Clone)]
struct AppState {
    behaviour: Behaviour,
    counters: Arc<Counters>,
}

async fn test_file(State(state): State<AppState>) -> Response {
    let counters = &state.counters;
    counters.hits.fetch_add(1, Ordering::SeqCst);
    let now = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    counters.max_in_flight.fetch_max(now, Ordering::SeqCst);

    if !state.behaviour.delay.is_zero() {
        tokio::time::sleep(state.behaviour.delay).await;
    }

    counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    (state.behaviour.status, state.behaviour.body.clone()).into_response()
}

/// Spawns a mock target on an ephemeral port.
///
/// The server runs on its own multi-threaded runtime so it keeps serving
/// while the test's current-thread runtime is busy driving the load test.
pub fn spawn_target(behaviour: Behaviour) -> MockTarget {
    let counters = Arc::new(Counters::default());
    let state = AppState {
        behaviour,
        counters: Arc::clone(&counters),
    };

    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    std_listener.set_nonblocking(true).unwrap();
    let addr = std_listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = TcpListener::from_std(std_listener).unwrap();
            let app = Router::new()
                .route("/test-file", get(test_file))
                .with_state(state);
            axum::serve(listener, app).await.unwrap();
        });
    });

    MockTarget { addr, counters }
}
