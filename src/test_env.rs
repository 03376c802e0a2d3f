//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::Config;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Test environment that sets up a txdash home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub(crate) struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with a default config.
    pub(crate) async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::create(temp_dir.path().join("txdash"), None)
            .await
            .unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub(crate) fn config(&self) -> Config {
        self.config.clone()
    }

    /// The txdash home directory.
    pub(crate) fn home(&self) -> &std::path::Path {
        self.config.root()
    }
}

struct Route {
    status: u16,
    body: String,
    fail_first: usize,
    hits: AtomicUsize,
}

/// Builds a local HTTP server with canned responses. Paths without a route get a 404.
#[derive(Default)]
pub(crate) struct MockServer {
    routes: HashMap<String, Route>,
}

impl MockServer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Always answers `path` with `status` and `body`.
    pub(crate) fn route(self, path: &str, status: u16, body: &str) -> Self {
        self.add(path, status, body, 0)
    }

    /// Answers `path` with a 500 for the first `fail_first` requests, then with a 200 and `body`.
    pub(crate) fn flaky_route(self, path: &str, fail_first: usize, body: &str) -> Self {
        self.add(path, 200, body, fail_first)
    }

    fn add(mut self, path: &str, status: u16, body: &str, fail_first: usize) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status,
                body: body.to_string(),
                fail_first,
                hits: AtomicUsize::new(0),
            },
        );
        self
    }

    /// Binds an ephemeral port on localhost and serves until the returned handle is dropped.
    pub(crate) async fn start(self) -> RunningServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = Arc::new(self.routes);
        let served = routes.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let routes = served.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let response = respond(&routes, req.uri().path());
                        async move { Ok::<_, Infallible>(response) }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });
        RunningServer {
            addr,
            routes,
            handle,
        }
    }
}

fn respond(routes: &HashMap<String, Route>, path: &str) -> Response<String> {
    let (status, body) = match routes.get(path) {
        None => (404, String::from("not found")),
        Some(route) => {
            let hit = route.hits.fetch_add(1, Ordering::SeqCst);
            if hit < route.fail_first {
                (500, String::from("internal server error"))
            } else {
                (route.status, route.body.clone())
            }
        }
    };
    let mut response = Response::new(body);
    *response.status_mut() =
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    response
}

/// A started `MockServer`. The server stops when this is dropped.
pub(crate) struct RunningServer {
    addr: SocketAddr,
    routes: Arc<HashMap<String, Route>>,
    handle: JoinHandle<()>,
}

impl RunningServer {
    pub(crate) fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// How many requests `path` has received.
    pub(crate) fn hits(&self, path: &str) -> usize {
        self.routes
            .get(path)
            .map(|r| r.hits.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
