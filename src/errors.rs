// Copyright 2026 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Error types for the server, the client wrappers, and the process watcher.

use {http::StatusCode, std::time::Duration, thiserror::Error};

/// Body of every response sent while the fail-control switch is on.
pub const FAILURE_MODE_MESSAGE: &str = "Instructed to fail this request";

/// Errors surfaced by the request dispatcher as HTTP responses.
#[derive(Debug, Error)]
pub enum RequestError {
    /// PATCH or PUT without a resource id in the path.
    #[error("no resource id in path")]
    MissingId,

    /// The id does not name a stored resource.
    #[error("no such resource: {0}")]
    NotFound(String),

    /// The path or method is not part of the server's surface.
    #[error("unsupported path: {0}")]
    UnsupportedPath(String),

    /// The fail-control switch is on. Displays as [`FAILURE_MODE_MESSAGE`].
    #[error("Instructed to fail this request")]
    InducedFailure,

    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(#[from] hyper::Error),

    /// The request body was not valid JSON.
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// A PATCH body must be a JSON object so its keys can be merged.
    #[error("patch body must be a JSON object")]
    NotAnObject,
}

impl RequestError {
    /// The HTTP status this error is reported as.
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::InducedFailure => StatusCode::INTERNAL_SERVER_ERROR,
            RequestError::MissingId
            | RequestError::UnsupportedPath(_)
            | RequestError::Body(_)
            | RequestError::MalformedBody(_)
            | RequestError::NotAnObject => StatusCode::BAD_REQUEST,
        }
    }
}

/// Errors surfaced by the client wrappers in [`crate::client`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be delivered.
    #[error("transport error: {0}")]
    Transport(#[from] hyper::Error),

    /// The server answered with a non-success status.
    #[error("request returned {status}: {body}")]
    Status {
        /// The response status.
        status: StatusCode,
        /// The response body, lossily decoded.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("response was not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The assembled request URI was invalid.
    #[error("invalid request uri: {0}")]
    Uri(#[from] http::uri::InvalidUri),

    /// The request could not be built.
    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),
}

/// Errors surfaced by [`crate::DeviceServerProcess`] to the test harness.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// The subprocess never reported the expected generation token.
    #[error("server did not report its generation token within {}s", timeout.as_secs())]
    StartupTimeout {
        /// How long the watcher polled before giving up.
        timeout: Duration,
    },

    /// The subprocess could not be spawned or killed.
    #[error("failed to manage server process: {0}")]
    Io(#[from] std::io::Error),
}
