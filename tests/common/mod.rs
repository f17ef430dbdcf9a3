//! Shared fixtures: handles over every backend and window size, and a tiny
//! HTTP/1.1 server for remote tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use locio::{AccessMode, BackingStore, DynHandle, Handle, LocalFileStore, MemoryStore, RemoteConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Window sizes every handle scenario runs under.
pub const WINDOW_SIZES: &[usize] = &[1, 2, 3, 7, 1024];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    File,
}

/// A handle plus whatever keeps its backing resource alive.
pub struct Fixture {
    pub handle: DynHandle,
    pub label: String,
    _dir: Option<tempfile::TempDir>,
}

impl Fixture {
    pub async fn open(backend: Backend, page: &[u8], mode: AccessMode, window: usize) -> Self {
        let label = format!("{backend:?}/window={window}");
        match backend {
            Backend::Memory => {
                let store: Box<dyn BackingStore> = Box::new(MemoryStore::new(page.to_vec(), mode));
                Self {
                    handle: Handle::new(store, window),
                    label,
                    _dir: None,
                }
            }
            Backend::File => {
                let dir = tempfile::tempdir().unwrap();
                let path = dir.path().join("page.bin");
                std::fs::write(&path, page).unwrap();
                let store: Box<dyn BackingStore> = Box::new(LocalFileStore::open(&path, mode).unwrap());
                Self {
                    handle: Handle::new(store, window),
                    label,
                    _dir: Some(dir),
                }
            }
        }
    }
}

/// One fixture per backend and window size.
pub async fn all_handles(page: &[u8], mode: AccessMode) -> Vec<Fixture> {
    let mut fixtures = Vec::new();
    for backend in [Backend::Memory, Backend::File] {
        for &window in WINDOW_SIZES {
            fixtures.push(Fixture::open(backend, page, mode, window).await);
        }
    }
    fixtures
}

/// Behaviour switches for [`TestServer`].
#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Advertise and honor `Range: bytes=N-`.
    pub ranges: bool,
    /// Answer HEAD requests; when false HEAD gets 405.
    pub head: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            ranges: true,
            head: true,
        }
    }
}

/// Serves fixed bodies by path over plain HTTP/1.1, one request per
/// connection.
pub struct TestServer {
    addr: SocketAddr,
    gets: Arc<AtomicUsize>,
}

impl TestServer {
    pub async fn start(routes: &[(&str, &[u8])], options: ServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<HashMap<String, Vec<u8>>> = Arc::new(
            routes
                .iter()
                .map(|(path, body)| (path.to_string(), body.to_vec()))
                .collect(),
        );
        let gets = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&gets);
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let routes = Arc::clone(&routes);
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    let _ = serve(socket, &routes, options, &counter).await;
                });
            }
        });

        Self { addr, gets }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET requests answered so far.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

/// Transport settings that never route test traffic through a proxy.
pub fn direct() -> RemoteConfig {
    RemoteConfig::default().without_proxy()
}

async fn serve(
    mut socket: TcpStream,
    routes: &HashMap<String, Vec<u8>>,
    options: ServerOptions,
    gets: &AtomicUsize,
) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&chunk[..n]);
    }

    let request = String::from_utf8_lossy(&request).into_owned();
    let mut lines = request.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let range_start = lines.find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if !name.trim().eq_ignore_ascii_case("range") {
            return None;
        }
        value
            .trim()
            .strip_prefix("bytes=")?
            .split('-')
            .next()?
            .parse::<usize>()
            .ok()
    });

    let Some(body) = routes.get(&path) else {
        return respond(&mut socket, "404 Not Found", &[], b"", false).await;
    };

    if method == "HEAD" {
        if !options.head {
            return respond(&mut socket, "405 Method Not Allowed", &[], b"", false).await;
        }
        let mut headers = vec![format!("Content-Length: {}", body.len())];
        if options.ranges {
            headers.push("Accept-Ranges: bytes".to_string());
        }
        return respond(&mut socket, "200 OK", &headers, b"", true).await;
    }

    gets.fetch_add(1, Ordering::SeqCst);
    match range_start {
        Some(start) if options.ranges && start < body.len() => {
            let headers = vec![
                format!("Content-Range: bytes {}-{}/{}", start, body.len() - 1, body.len()),
                "Accept-Ranges: bytes".to_string(),
            ];
            respond(&mut socket, "206 Partial Content", &headers, &body[start..], false).await
        }
        _ => respond(&mut socket, "200 OK", &[], body, false).await,
    }
}

async fn respond(
    socket: &mut TcpStream,
    status: &str,
    headers: &[String],
    body: &[u8],
    head_only: bool,
) -> std::io::Result<()> {
    let mut response = format!("HTTP/1.1 {status}\r\nConnection: close\r\n");
    let declares_length = headers.iter().any(|h| h.starts_with("Content-Length"));
    for header in headers {
        response.push_str(header);
        response.push_str("\r\n");
    }
    if !declares_length && !head_only {
        response.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    response.push_str("\r\n");

    socket.write_all(response.as_bytes()).await?;
    socket.write_all(body).await?;
    socket.shutdown().await
}
