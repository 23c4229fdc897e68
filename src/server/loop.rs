// Server loop module
// Accepts connections until a shutdown notification arrives

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::handle_connection;
use crate::config::AppState;
use crate::logger;

/// Accept loop
///
/// Each accepted connection is handed to its own task. Returns once `shutdown` is
/// notified; connections still in flight are not awaited.
pub async fn run_server(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        handle_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                logger::log_shutdown();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_listener;
    use std::net::SocketAddr;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    struct RawResponse {
        status_line: String,
        headers: String,
        body: Vec<u8>,
    }

    impl RawResponse {
        fn header(&self, name: &str) -> Option<String> {
            let prefix = format!("{}:", name.to_ascii_lowercase());
            self.headers.lines().find_map(|line| {
                line.to_ascii_lowercase()
                    .strip_prefix(&prefix)
                    .map(|v| v.trim().to_string())
            })
        }
    }

    async fn send(addr: SocketAddr, method: &str, path: &str) -> RawResponse {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request =
            format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();

        let split = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("response has a header terminator");
        let head = String::from_utf8(raw[..split].to_vec()).unwrap();
        let (status_line, headers) = head.split_once("\r\n").unwrap_or((head.as_str(), ""));

        RawResponse {
            status_line: status_line.to_string(),
            headers: headers.to_string(),
            body: raw[split + 4..].to_vec(),
        }
    }

    async fn start(dir: &TempDir) -> (SocketAddr, Arc<Notify>, tokio::task::JoinHandle<()>) {
        start_with(dir, Config::load(Some(0)).unwrap()).await
    }

    async fn start_with(
        dir: &TempDir,
        config: Config,
    ) -> (SocketAddr, Arc<Notify>, tokio::task::JoinHandle<()>) {
        let state = Arc::new(AppState::new(config, dir.path().to_path_buf()));
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let handle = tokio::spawn(run_server(listener, state, Arc::clone(&shutdown)));
        (addr, shutdown, handle)
    }

    fn script_body(i: usize) -> String {
        format!("#!/bin/sh\n# script {i}\necho \"run {i}\"\n")
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_clients() {
        let dir = TempDir::new().unwrap();
        for i in 0..4 {
            std::fs::write(dir.path().join(format!("script{i}.sh")), script_body(i)).unwrap();
        }
        std::fs::write(dir.path().join("readme.md"), "ignored").unwrap();
        let (addr, shutdown, handle) = start(&dir).await;

        let mut clients = Vec::new();
        for i in 0..24 {
            clients.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    let resp = send(addr, "GET", "/api/files").await;
                    (None, resp)
                } else {
                    let n = i % 4;
                    let resp = send(addr, "GET", &format!("/api/file/script{n}.sh")).await;
                    (Some(n), resp)
                }
            }));
        }

        for client in clients {
            let (script, resp) = client.await.unwrap();
            assert!(resp.status_line.starts_with("HTTP/1.1 200"), "{}", resp.status_line);
            assert_eq!(resp.header("content-length"), Some(resp.body.len().to_string()));
            assert_eq!(resp.header("access-control-allow-origin").as_deref(), Some("*"));
            match script {
                None => {
                    let names: Vec<String> = serde_json::from_slice(&resp.body).unwrap();
                    assert_eq!(names, vec!["script0.sh", "script1.sh", "script2.sh", "script3.sh"]);
                }
                Some(n) => assert_eq!(resp.body, script_body(n).into_bytes()),
            }
        }

        shutdown.notify_one();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_status_codes_over_the_wire() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ok.sh"), "true\n").unwrap();
        let (addr, shutdown, handle) = start(&dir).await;

        let cases = [
            ("/", "404"),
            ("/api/file/ghost.sh", "404"),
            ("/api/file/..%2F..%2Fetc%2Fpasswd", "400"),
            ("/api/file/notes.txt", "400"),
            ("/api/unknown", "404"),
            ("/favicon.ico", "404"),
            ("/api/file/ok.sh", "200"),
            ("/api/files?x=1", "404"),
            ("/api/file/ok.sh?download=1", "400"),
        ];
        for (path, code) in cases {
            let resp = send(addr, "GET", path).await;
            assert!(
                resp.status_line.starts_with(&format!("HTTP/1.1 {code}")),
                "{path}: {}",
                resp.status_line
            );
        }

        std::fs::write(dir.path().join("index.html"), "<html>viewer</html>").unwrap();
        let resp = send(addr, "GET", "/").await;
        assert!(resp.status_line.starts_with("HTTP/1.1 200"));
        assert_eq!(resp.header("content-type").as_deref(), Some("text/html"));
        assert_eq!(resp.body, b"<html>viewer</html>");

        let resp = send(addr, "GET", "/?v=2").await;
        assert!(resp.status_line.starts_with("HTTP/1.1 404"), "{}", resp.status_line);

        let resp = send(addr, "DELETE", "/api/file/ok.sh").await;
        assert!(resp.status_line.starts_with("HTTP/1.1 405"));

        shutdown.notify_one();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_idle_keep_alive_connection_is_closed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ok.sh"), "true\n").unwrap();
        let mut config = Config::load(Some(0)).unwrap();
        config.performance.read_timeout = 1;
        config.performance.write_timeout = 1;
        let (addr, shutdown, handle) = start_with(&dir, config).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /api/file/ok.sh HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        // No `Connection: close`, so EOF only arrives once the server drops the idle connection
        let mut raw = Vec::new();
        tokio::time::timeout(
            std::time::Duration::from_secs(10),
            stream.read_to_end(&mut raw),
        )
        .await
        .expect("server closes the idle connection")
        .unwrap();

        let text = String::from_utf8(raw).unwrap();
        assert!(text.starts_with("HTTP/1.1 200"), "{text}");
        assert!(text.ends_with("true\n"));

        shutdown.notify_one();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_accepting() {
        let dir = TempDir::new().unwrap();
        let (addr, shutdown, handle) = start(&dir).await;

        shutdown.notify_one();
        handle.await.unwrap();

        assert!(TcpStream::connect(addr).await.is_err());
    }
}
