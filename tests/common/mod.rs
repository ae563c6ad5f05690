//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use media_cache_proxy::config::LifecycleConfig;
use media_cache_proxy::proxy::{AllowedExtensions, RequestHandler};
use media_cache_proxy::store::{CacheStore, MemoryStore, StoreError};
use media_cache_proxy::upstream::{Origin, OriginClient, UpstreamPool};
use media_cache_proxy::{HttpServer, Shutdown};

/// What a mock origin answers with.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn ok(body: &[u8]) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.to_vec(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: b"origin says no".to_vec(),
        }
    }

    pub fn redirect(status: u16, location: &str) -> Self {
        Self {
            status,
            headers: vec![("Location", location.to_string())],
            body: Vec::new(),
        }
    }
}

/// Requests seen by a mock origin.
#[derive(Debug, Clone, Default)]
pub struct Seen {
    paths: Arc<Mutex<Vec<String>>>,
}

impl Seen {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.paths.lock().unwrap().len()
    }
}

/// Start a programmable mock origin on an ephemeral port.
///
/// `f` receives the request path and decides the reply.
pub async fn start_programmable_origin<F, Fut>(f: F) -> (SocketAddr, Seen)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Seen::default();
    let f = Arc::new(f);

    let recorder = seen.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    let recorder = recorder.clone();
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(socket);
                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).await.is_err() {
                            return;
                        }
                        // Drain headers.
                        loop {
                            let mut line = String::new();
                            match reader.read_line(&mut line).await {
                                Ok(0) => break,
                                Ok(_) if line == "\r\n" => break,
                                Ok(_) => continue,
                                Err(_) => return,
                            }
                        }

                        let path = request_line
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or("/")
                            .to_string();
                        recorder.paths.lock().unwrap().push(path.clone());

                        let reply = f(path).await;
                        let reason = StatusCode::from_u16(reply.status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("Unknown");

                        let mut head = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                            reply.status,
                            reason,
                            reply.body.len()
                        );
                        for (name, value) in &reply.headers {
                            head.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        head.push_str("\r\n");

                        let mut socket = reader.into_inner();
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(&reply.body).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, seen)
}

/// Start a mock origin that always returns the same reply.
pub async fn start_mock_origin(reply: Reply) -> (SocketAddr, Seen) {
    start_programmable_origin(move |_| {
        let reply = reply.clone();
        async move { reply }
    })
    .await
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Memory store that counts `sync` calls.
#[derive(Debug, Clone, Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    syncs: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn syncs(&self) -> usize {
        self.syncs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.inner.put(key, value).await
    }

    async fn sync(&self) -> Result<(), StoreError> {
        self.syncs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Build a handler over real `OriginClient`s for `origins`.
pub fn handler(store: Arc<dyn CacheStore>, origins: &[SocketAddr]) -> RequestHandler {
    let config = media_cache_proxy::config::UpstreamConfig {
        urls: origins.iter().map(|a| format!("http://{}/", a)).collect(),
        keepalive: 4,
        ..Default::default()
    };
    let endpoints = config
        .urls
        .iter()
        .map(|u| Arc::new(OriginClient::new(u, &config).unwrap()) as Arc<dyn Origin>)
        .collect();
    RequestHandler::new(
        AllowedExtensions::new(["jpg", "jpeg", "png", "gif"]),
        store,
        Arc::new(UpstreamPool::new(endpoints).unwrap()),
    )
}

/// A running proxy.
pub struct Proxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<std::io::Result<()>>,
}

impl Proxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server to drain and sync.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap();
    }
}

/// Start a proxy on an ephemeral port.
pub async fn start_proxy(handler: RequestHandler, grace_period_secs: u64) -> Proxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let server = HttpServer::new(handler, &LifecycleConfig { grace_period_secs });
    let task = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    Proxy {
        addr,
        shutdown,
        task,
    }
}

/// Client that shows redirects instead of following them and never reuses connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
