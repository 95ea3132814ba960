//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use string_search_server::config::ServerConfig;
use string_search_server::lifecycle::{prepare, Shutdown};
use string_search_server::net::ConnectionTracker;

/// Corpus file in a private temporary directory.
pub struct Corpus {
    _dir: tempfile::TempDir,
    path: PathBuf,
}

impl Corpus {
    pub fn new(contents: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        std::fs::write(&path, contents).unwrap();
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append_line(&self, line: &str) {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .unwrap();
        writeln!(file, "{line}").unwrap();
    }
}

/// A running server bound to an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub tracker: ConnectionTracker,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn stop(&self) {
        self.shutdown.trigger();
    }

    /// Wait up to five seconds for the open connection count to reach `expected`.
    pub async fn wait_for_active(&self, expected: u64) -> bool {
        for _ in 0..50 {
            if self.tracker.active_count() == expected {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        false
    }
}

/// Config for `corpus` listening on 127.0.0.1 with an OS-assigned port.
pub fn config_for(corpus: &Corpus, reread_on_query: bool) -> ServerConfig {
    let mut config = ServerConfig {
        linuxpath: corpus.path().to_string_lossy().into_owned(),
        reread_on_query,
        ..ServerConfig::default()
    };
    config.listener.bind_address = "127.0.0.1:0".into();
    config
}

pub async fn start_server(config: ServerConfig) -> TestServer {
    let prepared = prepare(&config).await.unwrap();
    let addr = prepared.listener.local_addr().unwrap();
    let tracker = prepared.server.tracker();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _watcher = prepared.watcher;
        let _ = prepared.server.run(prepared.listener, rx).await;
    });

    TestServer {
        addr,
        tracker,
        shutdown,
    }
}

/// Line-oriented test client.
pub struct Client {
    stream: BufReader<TcpStream>,
}

impl Client {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Send `query` plus a newline and return the reply line.
    pub async fn query(&mut self, query: &str) -> String {
        self.send_raw(format!("{query}\n").as_bytes()).await;
        self.read_reply().await
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.get_mut().write_all(bytes).await.unwrap();
    }

    /// Next reply line, or an empty string once the server closed the connection.
    pub async fn read_reply(&mut self) -> String {
        let mut line = String::new();
        let _ = self.stream.read_line(&mut line).await;
        line
    }
}
