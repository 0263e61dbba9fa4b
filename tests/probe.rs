//! Probe executor against a live in-process server: classification of
//! responses, transport failures and deadlines.

mod common;

use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use common::{refused_addr, start_server};
use link_prober::{parse_line, OutcomeKind, ParsedLine, ProbeConfig, Prober, Target};

fn prober(timeout: Duration) -> Prober {
    let config = ProbeConfig {
        request_timeout: timeout,
        ..ProbeConfig::default()
    };
    Prober::new(&config).unwrap()
}

fn target(line: &str) -> Target {
    match parse_line(line) {
        ParsedLine::Target(target) => target,
        other => panic!("expected target for {:?}, got {:?}", line, other),
    }
}

#[tokio::test]
async fn ok_response_is_alive() {
    let server = start_server().await;
    let outcome = prober(Duration::from_secs(2))
        .probe(target(&server.url("/ok")))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Success);
    assert_eq!(outcome.status_code, Some(200));
    assert_eq!(outcome.method, "HEAD");
    assert!(outcome.redirect_location.is_none());
    assert!(outcome.is_alive());
}

#[tokio::test]
async fn redirect_is_reported_not_followed() {
    let server = start_server().await;
    let outcome = prober(Duration::from_secs(2))
        .probe(target(&format!("GET {}", server.url("/redirect"))))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Success);
    assert_eq!(outcome.status_code, Some(301));
    assert_eq!(outcome.redirect_location.as_deref(), Some("https://b"));
    assert!(outcome.is_alive());
}

#[tokio::test]
async fn client_and_server_errors_are_success_but_not_alive() {
    let server = start_server().await;
    let prober = prober(Duration::from_secs(2));

    for (path, code) in [("/missing", 404), ("/broken", 500)] {
        let outcome = prober.probe(target(&format!("GET {}", server.url(path)))).await;
        assert_eq!(outcome.kind, OutcomeKind::Success);
        assert_eq!(outcome.status_code, Some(code));
        assert!(!outcome.is_alive());
    }
}

#[tokio::test]
async fn requested_method_is_sent() {
    let server = start_server().await;
    let prober = prober(Duration::from_secs(2));

    let post = prober
        .probe(target(&format!("post {}", server.url("/only-post"))))
        .await;
    assert_eq!(post.status_code, Some(201));
    assert_eq!(post.method, "POST");

    let get = prober
        .probe(target(&format!("GET {}", server.url("/only-post"))))
        .await;
    assert_eq!(get.status_code, Some(405));
}

#[tokio::test]
async fn refused_connection_is_error() {
    let addr = refused_addr();
    let outcome = prober(Duration::from_secs(2))
        .probe(target(&format!("http://{}/", addr)))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Error);
    assert!(outcome.status_code.is_none());
    assert!(outcome.detail.unwrap().contains("connection failed"));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = start_server().await;
    let outcome = prober(Duration::from_millis(200))
        .probe(target(&server.url("/delay/3000")))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Timeout);
    assert!(outcome.status_code.is_none());
    assert!(outcome.detail.unwrap().contains("timed out after 200 ms"));
}

#[tokio::test]
async fn timeout_returns_at_the_deadline() {
    let server = start_server().await;
    let started = Instant::now();
    let outcome = prober(Duration::from_millis(150))
        .probe(target(&server.url("/delay/5000")))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Timeout);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn timeout_closes_the_connection() {
    // A raw listener that accepts, reads the request and never answers
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let n = socket.read(&mut buf).await.unwrap();
        assert!(n > 0, "expected the request to arrive");
        let waiting_since = Instant::now();
        // EOF or a reset both mean the client side is gone
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return waiting_since.elapsed(),
                Ok(_) => continue,
            }
        }
    });

    let outcome = prober(Duration::from_millis(200))
        .probe(target(&format!("GET http://{}/hang", addr)))
        .await;
    assert_eq!(outcome.kind, OutcomeKind::Timeout);

    let closed_after = tokio::time::timeout(Duration::from_secs(2), server)
        .await
        .expect("connection still open 2s after the deadline")
        .unwrap();
    assert!(closed_after < Duration::from_secs(2));
}

#[tokio::test]
async fn unparsable_url_is_invalid_without_request() {
    let server = start_server().await;
    let outcome = prober(Duration::from_secs(2))
        .probe(target("GET http://[::1/busy"))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::InvalidUrl);
    assert_eq!(server.state.hits.load(std::sync::atomic::Ordering::SeqCst), 0);
}
