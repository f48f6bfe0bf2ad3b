//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed routes by path. Unknown paths get 404. Hit counts per path are
//! recorded so tests can assert on retries.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with this body.
    Body(Vec<u8>),
    /// Bare status with empty body.
    Status(u16),
    /// 503 for the first `failures` hits, then 200 with `body`.
    Flaky { failures: usize, body: Vec<u8> },
    /// Headers promise a large body, then one byte every 100ms.
    Stall,
}

pub struct FileServer {
    pub base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl FileServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    pub fn hits(&self, path: &str) -> usize {
        let path = format!("/{}", path.trim_start_matches('/'));
        self.hits.lock().unwrap().get(&path).copied().unwrap_or(0)
    }
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start(routes: HashMap<&str, Route>) -> FileServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(k, v)| (format!("/{}", k.trim_start_matches('/')), v))
            .collect(),
    );
    let hits = Arc::new(Mutex::new(HashMap::new()));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&server_hits);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    FileServer {
        base: format!("http://127.0.0.1:{}/", port),
        hits,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    hits: &Mutex<HashMap<String, usize>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let path = request
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let hit = {
        let mut h = hits.lock().unwrap();
        let c = h.entry(path.clone()).or_insert(0);
        *c += 1;
        *c
    };

    match routes.get(&path) {
        None => respond(&mut stream, "404 Not Found", b""),
        Some(Route::Body(body)) => respond(&mut stream, "200 OK", body),
        Some(Route::Status(code)) => respond(&mut stream, &format!("{} Status", code), b""),
        Some(Route::Flaky { failures, body }) => {
            if hit <= *failures {
                respond(&mut stream, "503 Service Unavailable", b"");
            } else {
                respond(&mut stream, "200 OK", body);
            }
        }
        Some(Route::Stall) => {
            let head = "HTTP/1.1 200 OK\r\nContent-Length: 1000000\r\n\r\n";
            if stream.write_all(head.as_bytes()).is_err() {
                return;
            }
            for _ in 0..200 {
                thread::sleep(Duration::from_millis(100));
                if stream.write_all(b"x").is_err() || stream.flush().is_err() {
                    return;
                }
            }
        }
    }
}

fn respond(stream: &mut std::net::TcpStream, status: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
