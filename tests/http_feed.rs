// tests/http_feed.rs
//
// HttpFeed against a local axum server on an ephemeral port.

use aircraft_archiver::ingest::providers::http_feed::HttpFeed;
use aircraft_archiver::ingest::types::FeedSource;
use axum::{http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use std::time::Duration;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

fn feed(addr: SocketAddr, path: &str, timeout: Duration) -> HttpFeed {
    HttpFeed::new(&addr.to_string(), path, timeout)
}

#[tokio::test]
async fn fetches_and_decodes_aircraft_json() {
    const BODY: &str = r#"{"now": 1700000000.4, "messages": 12, "aircraft": [{"hex": "4ca1d3"}]}"#;
    let app = Router::new().route("/aircraft.json", get(|| async { BODY }));
    let addr = serve(app).await;

    let snap = feed(addr, "/aircraft.json", Duration::from_secs(5))
        .fetch()
        .await
        .expect("fetch ok");
    assert_eq!(snap.now(), 1_700_000_000.4);
    assert_eq!(snap.doc()["aircraft"][0]["hex"], "4ca1d3");
}

#[tokio::test]
async fn alternate_feed_path_is_honoured() {
    let app = Router::new().route("/aircrafts.json", get(|| async { r#"{"now": 5}"# }));
    let addr = serve(app).await;

    assert!(feed(addr, "/aircraft.json", Duration::from_secs(5)).fetch().await.is_err());
    let snap = feed(addr, "/aircrafts.json", Duration::from_secs(5))
        .fetch()
        .await
        .expect("fetch ok");
    assert_eq!(snap.now(), 5.0);
}

#[tokio::test]
async fn server_error_and_bad_body_are_errors() {
    let app = Router::new()
        .route(
            "/aircraft.json",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
        )
        .route("/broken.json", get(|| async { "{\"now\": " }))
        .route("/nonow.json", get(|| async { r#"{"aircraft": []}"# }));
    let addr = serve(app).await;

    for path in ["/aircraft.json", "/broken.json", "/nonow.json"] {
        let err = feed(addr, path, Duration::from_secs(5)).fetch().await.unwrap_err();
        assert!(format!("{err:#}").contains(path), "error mentions url: {err:#}");
    }
}

#[tokio::test]
async fn slow_upstream_hits_the_request_timeout() {
    let app = Router::new().route(
        "/aircraft.json",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            r#"{"now": 1}"#
        }),
    );
    let addr = serve(app).await;

    let started = std::time::Instant::now();
    let res = feed(addr, "/aircraft.json", Duration::from_millis(200)).fetch().await;
    assert!(res.is_err());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn unreachable_host_is_an_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    assert!(feed(addr, "/aircraft.json", Duration::from_secs(2)).fetch().await.is_err());
}
