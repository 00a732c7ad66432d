//! Tests for the HTTP coverage probe against a minimal in-process endpoint

use bb_e2e_core::{CoverageProbe, HttpCoverageProbe, VerificationError};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `GET /coverage` (JSON array) and `DELETE /coverage` (clear) until
/// the test ends. Any other path answers 404.
async fn spawn_coverage_endpoint(labels: Arc<Mutex<Vec<String>>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let labels = labels.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                }
                let request = String::from_utf8_lossy(&buf[..read]).to_string();
                let mut first = request.lines().next().unwrap_or_default().split(' ');
                let method = first.next().unwrap_or_default();
                let path = first.next().unwrap_or_default();

                let (status, body) = match (method, path) {
                    ("GET", "/coverage") => {
                        let body = serde_json::to_string(&*labels.lock().unwrap()).unwrap();
                        ("200 OK", body)
                    }
                    ("DELETE", "/coverage") => {
                        labels.lock().unwrap().clear();
                        ("204 No Content", String::new())
                    }
                    _ => ("404 Not Found", String::new()),
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn test_snapshot_and_reset_round_trip() {
    let labels = Arc::new(Mutex::new(vec![
        "XML_STRING_TO_XML".to_string(),
        "XML_XML_TO_STRING".to_string(),
    ]));
    let base = spawn_coverage_endpoint(labels.clone()).await;
    let probe = HttpCoverageProbe::new(format!("{base}/coverage"));

    let snapshot = probe.snapshot().await.unwrap();
    assert!(snapshot.are_covered(["XML_STRING_TO_XML", "XML_XML_TO_STRING"]));

    probe.reset().await.unwrap();
    assert!(labels.lock().unwrap().is_empty());
    assert!(probe.snapshot().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_http_error_status_is_probe_error() {
    let base = spawn_coverage_endpoint(Arc::default()).await;
    let probe = HttpCoverageProbe::new(format!("{base}/missing"));

    let err = probe.snapshot().await.unwrap_err();
    assert!(matches!(err, VerificationError::Probe { .. }));
    assert!(err.to_string().contains("GET"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_probe_error() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let probe = HttpCoverageProbe::new(format!("http://{addr}/coverage"));
    assert!(matches!(
        probe.reset().await,
        Err(VerificationError::Probe { .. })
    ));
}
