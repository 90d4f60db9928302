// Copyright 2026 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Thin client wrappers over the server's HTTP surface.
//!
//! Each wrapper covers one handler: [`MetaClient`] the generation token,
//! [`FailControlClient`] the fault-injection switch, and [`ResourceClient`]
//! one resource base path. None of them retry; a non-success status is
//! surfaced as [`ClientError::Status`].

use {
    crate::errors::ClientError,
    http::StatusCode,
    hyper::{client::HttpConnector, header, Body, Client, Method, Request, Response},
    serde_json::Value,
};

async fn read_body(response: Response<Body>) -> Result<(StatusCode, Vec<u8>), ClientError> {
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    Ok((status, bytes.to_vec()))
}

fn check_ok(status: StatusCode, body: Vec<u8>) -> Result<Vec<u8>, ClientError> {
    if status == StatusCode::OK {
        Ok(body)
    } else {
        Err(ClientError::Status { status, body: String::from_utf8_lossy(&body).into_owned() })
    }
}

/// Client for the `meta` handler.
pub struct MetaClient {
    client: Client<HttpConnector>,
    server_url: String,
}

impl MetaClient {
    /// Creates a client for the server at `server_url`.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self { client: Client::new(), server_url: trim_url(server_url.into()) }
    }

    /// Fetches the server's generation token.
    pub async fn generation(&self) -> Result<String, ClientError> {
        let uri: hyper::Uri = format!("{}/meta/generation", self.server_url).parse()?;
        let (status, body) = read_body(self.client.get(uri).await?).await?;
        let body = check_ok(status, body)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Client for the fail-control switch.
pub struct FailControlClient {
    client: Client<HttpConnector>,
    server_url: String,
}

impl FailControlClient {
    /// Creates a client for the server at `server_url`.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self { client: Client::new(), server_url: trim_url(server_url.into()) }
    }

    /// Makes every subsequent request to the server fail with 500.
    pub async fn start_failing_requests(&self) -> Result<(), ClientError> {
        self.post("start_failing_requests").await
    }

    /// Restores normal request handling.
    pub async fn stop_failing_requests(&self) -> Result<(), ClientError> {
        self.post("stop_failing_requests").await
    }

    async fn post(&self, operation: &str) -> Result<(), ClientError> {
        let uri: hyper::Uri = format!("{}/fail_control/{}", self.server_url, operation).parse()?;
        let request = Request::builder().method(Method::POST).uri(uri).body(Body::empty())?;
        let (status, body) = read_body(self.client.request(request).await?).await?;
        check_ok(status, body).map(|_| ())
    }
}

/// Client for one resource base path, e.g. `devices`.
pub struct ResourceClient {
    client: Client<HttpConnector>,
    server_url: String,
    base: String,
}

impl ResourceClient {
    /// Creates a client for the resources under `base` on the server at
    /// `server_url`.
    pub fn new(server_url: impl Into<String>, base: impl Into<String>) -> Self {
        Self { client: Client::new(), server_url: trim_url(server_url.into()), base: base.into() }
    }

    /// Creates or fully replaces the resource, returning the stored value.
    pub async fn put(&self, id: &str, value: &Value) -> Result<Value, ClientError> {
        self.send_json(Method::PUT, id, Some(value)).await
    }

    /// Shallow-merges `patch` into the resource, returning the merged value.
    pub async fn patch(&self, id: &str, patch: &Value) -> Result<Value, ClientError> {
        self.send_json(Method::PATCH, id, Some(patch)).await
    }

    /// Fetches the resource.
    pub async fn get(&self, id: &str) -> Result<Value, ClientError> {
        self.send_json(Method::GET, id, None).await
    }

    /// Deletes the resource.
    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.send_json(Method::DELETE, id, None).await.map(|_| ())
    }

    /// Lists the ids of all resources on the server, sorted.
    pub async fn list(&self) -> Result<Vec<String>, ClientError> {
        let uri: hyper::Uri = format!("{}/{}", self.server_url, self.base).parse()?;
        let (status, body) = read_body(self.client.get(uri).await?).await?;
        let body = check_ok(status, body)?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_json(
        &self,
        method: Method,
        id: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let uri: hyper::Uri = format!("{}/{}/{}", self.server_url, self.base, id).parse()?;
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        let (status, body) = read_body(self.client.request(request).await?).await?;
        let body = check_ok(status, body)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
