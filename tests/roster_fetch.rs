// tests/roster_fetch.rs
// Roster client against a canned HTTP/1.1 responder on loopback.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use threes_check::{
    config::options::RosterOptions,
    error::RunError,
    log::RunLog,
    roster::RosterClient,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

const ACTIVE: &str = r#"[
    {"FirstName": "Luka", "LastName": "Doncic", "NbaDotComPlayerID": 1629029, "Status": "Active"},
    {"FirstName": "Kyrie", "LastName": "Irving", "NbaDotComPlayerID": 202681, "Status": "Active"}
]"#;

const NONE_ACTIVE: &str = r#"[
    {"FirstName": "Old", "LastName": "Timer", "NbaDotComPlayerID": 1, "Status": "Inactive"}
]"#;

/// Serves `status`/`body` to every request. Returns the base URL and the request lines seen.
async fn serve(status: u16, body: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else { return };
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match sock.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf);
                log.lock().unwrap().push(head.lines().next().unwrap_or_default().to_string());

                // Hold the response so overlapping callers really overlap.
                tokio::time::sleep(Duration::from_millis(50)).await;
                let reply = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(reply.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });
    (base, seen)
}

fn client(base: &str) -> RosterClient {
    let opts = RosterOptions {
        api_key: Some("secret".into()),
        api_base: base.to_string(),
        ..Default::default()
    };
    RosterClient::new(&opts, Arc::new(RunLog::new())).unwrap()
}

#[tokio::test]
async fn request_carries_team_and_key() {
    let (base, seen) = serve(200, ACTIVE).await;
    let players = client(&base).active_players().await.unwrap().to_vec();

    assert_eq!(players.len(), 2);
    assert_eq!(players[0].display_name(), "Luka Doncic");
    let lines = seen.lock().unwrap().clone();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("GET /v3/nba/scores/json/Players/DAL?key=secret "), "{}", lines[0]);
}

#[tokio::test]
async fn no_active_players_is_a_run_error() {
    let (base, _) = serve(200, NONE_ACTIVE).await;
    match client(&base).active_players().await {
        Err(RunError::NoActivePlayers(team)) => assert_eq!(team, "DAL"),
        other => panic!("expected NoActivePlayers, got {other:?}"),
    }
}

#[tokio::test]
async fn error_status_is_a_network_error() {
    let (base, _) = serve(401, r#"{"statusCode": 401, "message": "Access denied"}"#).await;
    let err = client(&base).active_players().await.unwrap_err();
    assert!(matches!(err, RunError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn concurrent_callers_share_one_fetch() {
    let (base, seen) = serve(200, ACTIVE).await;
    let roster = client(&base);

    let (a, b) = tokio::join!(roster.active_players(), roster.active_players());
    assert_eq!(a.unwrap(), b.unwrap());
    // A later call is served from the cache too.
    assert_eq!(roster.active_players().await.unwrap().len(), 2);
    assert_eq!(seen.lock().unwrap().len(), 1);
}
