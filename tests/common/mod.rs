//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use route_dispatch::http::{Dispatcher, ServerContext, ServerError};
use route_dispatch::lifecycle::Shutdown;
use route_dispatch::net::Listener;
use route_dispatch::routing::{Discovery, RouteRegistry};
use route_dispatch::ServerConfig;

pub const SERVER_HEADER: &str = "route-dispatch/test";

/// A dispatcher running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.server.header = SERVER_HEADER.into();
    config
}

/// Start a dispatcher serving the routes `discovery` yields.
pub async fn start_server<D: Discovery>(discovery: &D, config: ServerConfig) -> TestServer {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let listener = Listener::from_tcp(tcp);
    let addr = listener.local_addr().unwrap();

    let registry = RouteRegistry::discover(discovery);
    let dispatcher = Dispatcher::new(ServerContext::new(config, registry)).unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let handle = tokio::spawn(dispatcher.run(listener, signal));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Send raw bytes and read until the server closes the connection.
pub async fn raw_request(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

/// A client that never pools connections or goes through a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
