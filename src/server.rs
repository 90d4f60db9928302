// Copyright 2026 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The hyper server and its request dispatcher.

use {
    crate::{errors::RequestError, resource::ResourceStore},
    anyhow::{Context as _, Error},
    futures::{channel::oneshot, FutureExt},
    hyper::{
        header,
        server::{conn::AddrIncoming, Server},
        service::{make_service_fn, service_fn},
        Body, Method, Request, Response, StatusCode,
    },
    log::{info, warn},
    parking_lot::Mutex,
    serde_json::{json, Value},
    std::{
        convert::Infallible,
        net::{IpAddr, Ipv4Addr, SocketAddr},
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
    },
    uuid::Uuid,
};

/// State shared between the serving task and the [`DeviceServer`] handle.
struct Inner {
    /// Fixed at construction; identifies this server instance to watchers.
    generation: String,
    failing: AtomicBool,
    resources: Mutex<ResourceStore>,
}

impl Inner {
    fn ensure_not_in_failure_mode(&self) -> Result<(), RequestError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RequestError::InducedFailure)
        } else {
            Ok(())
        }
    }
}

/// Builder for [`DeviceServer`].
pub struct DeviceServerBuilder {
    generation: Option<String>,
    addr: SocketAddr,
}

impl DeviceServerBuilder {
    /// Sets the generation token to report; defaults to a fresh UUIDv4.
    pub fn generation(mut self, token: impl Into<String>) -> Self {
        self.generation = Some(token.into());
        self
    }

    /// Sets the address to bind; defaults to localhost on an ephemeral port.
    pub fn addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Binds the listening socket and starts serving on the current tokio
    /// runtime.
    pub fn start(self) -> Result<DeviceServer, Error> {
        let generation = self.generation.unwrap_or_else(|| Uuid::new_v4().to_string());
        let inner = Arc::new(Inner {
            generation,
            failing: AtomicBool::new(false),
            resources: Mutex::new(ResourceStore::new()),
        });

        let incoming = AddrIncoming::bind(&self.addr)
            .with_context(|| format!("binding mock device server to {}", self.addr))?;
        let addr = incoming.local_addr();

        let state = Arc::clone(&inner);
        let make_service = make_service_fn(move |_conn| {
            let inner = Arc::clone(&state);
            async move {
                Ok::<_, Infallible>(service_fn(move |req| {
                    let inner = Arc::clone(&inner);
                    async move { Ok::<_, Infallible>(handle_request(&inner, req).await) }
                }))
            }
        });

        let (stop, rx_stop) = oneshot::channel();
        let server = Server::builder(incoming)
            .serve(make_service)
            .with_graceful_shutdown(rx_stop.map(|res| res.unwrap_or(())));
        let task = tokio::spawn(async move {
            if let Err(e) = server.await {
                warn!("mock device server exited with error: {}", e);
            }
        });

        Ok(DeviceServer { addr, inner, stop: Some(stop), task })
    }
}

/// A running mock device server.
///
/// Dropping the handle leaves the serving task running until the runtime
/// shuts down; call [`DeviceServer::stop`] for an orderly teardown.
pub struct DeviceServer {
    addr: SocketAddr,
    inner: Arc<Inner>,
    stop: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl DeviceServer {
    /// Returns a builder serving on localhost with an ephemeral port.
    pub fn builder() -> DeviceServerBuilder {
        DeviceServerBuilder {
            generation: None,
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
        }
    }

    /// The bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The base URL of the server's HTTP surface.
    pub fn local_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The generation token this instance reports.
    pub fn generation(&self) -> &str {
        &self.inner.generation
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn stop(self) {
        let Self { stop, task, .. } = self;
        if let Some(stop) = stop {
            let _ = stop.send(());
        }
        let _ = task.await;
    }

    /// Runs until the serving task exits. The standalone binary's main loop.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

async fn handle_request(inner: &Inner, req: Request<Body>) -> Response<Body> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = route(inner, req).await.unwrap_or_else(error_response);
    info!("{} {} -> {}", method, path, response.status().as_u16());
    response
}

/// Dispatches a request to the fail-control, meta, or resource handlers.
///
/// Every handler except fail control short-circuits with 500 while the
/// fail-control switch is on; fail control itself is exempt so the switch can
/// be turned back off.
async fn route(inner: &Inner, req: Request<Body>) -> Result<Response<Body>, RequestError> {
    let path = req.uri().path().to_string();
    let owned: Vec<String> =
        path.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect();
    let segments: Vec<&str> = owned.iter().map(String::as_str).collect();

    if segments.first() != Some(&"fail_control") {
        inner.ensure_not_in_failure_mode()?;
    }

    let method = req.method().clone();
    match (&method, segments.as_slice()) {
        (&Method::POST, ["fail_control", "start_failing_requests"]) => {
            inner.failing.store(true, Ordering::SeqCst);
            info!("fail control: failing all requests");
            Ok(json_response(&json!({})))
        }
        (&Method::POST, ["fail_control", "stop_failing_requests"]) => {
            inner.failing.store(false, Ordering::SeqCst);
            info!("fail control: serving normally");
            Ok(json_response(&json!({})))
        }
        (_, ["fail_control", ..]) => Err(RequestError::UnsupportedPath(path)),
        (&Method::GET, ["meta", "generation"]) => Ok(text_response(&inner.generation)),
        // Everything else under meta is a 400 with an empty body.
        (_, ["meta", ..]) => Ok(empty_bad_request()),
        (&Method::PUT, [_base, id]) => {
            let id = id.to_string();
            let value = read_json_body(req.into_body()).await?;
            let stored = inner.resources.lock().replace(&id, value);
            Ok(json_response(&stored))
        }
        (&Method::PATCH, [_base, id]) => {
            let id = id.to_string();
            let patch = read_json_body(req.into_body()).await?;
            let merged = inner.resources.lock().merge(&id, patch)?;
            Ok(json_response(&merged))
        }
        (&Method::GET, [_base, id]) => {
            let value = inner.resources.lock().get(id)?;
            Ok(json_response(&value))
        }
        (&Method::DELETE, [_base, id]) => {
            inner.resources.lock().delete(id)?;
            Ok(json_response(&json!({})))
        }
        (&Method::GET, [_base]) => Ok(json_response(&json!(inner.resources.lock().ids()))),
        (&Method::PUT | &Method::PATCH, [_base]) => Err(RequestError::MissingId),
        _ => Err(RequestError::UnsupportedPath(path)),
    }
}

async fn read_json_body(body: Body) -> Result<Value, RequestError> {
    let bytes = hyper::body::to_bytes(body).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn json_response(value: &Value) -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap()
}

fn text_response(body: &str) -> Response<Body> {
    Response::builder().status(StatusCode::OK).body(Body::from(body.to_string())).unwrap()
}

fn empty_bad_request() -> Response<Body> {
    Response::builder().status(StatusCode::BAD_REQUEST).body(Body::empty()).unwrap()
}

fn error_response(err: RequestError) -> Response<Body> {
    Response::builder().status(err.status()).body(Body::from(err.to_string())).unwrap()
}
