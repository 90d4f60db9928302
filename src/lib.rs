// Copyright 2026 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Test-only mock of a cloud device registration backend.
//!
//! The server keeps a store of JSON resources mutable over HTTP, exposes a
//! per-process generation token so a test harness can confirm which server
//! instance is answering, and carries a fail-control switch that makes every
//! request fail with 500 until switched off. It can be served in-process on
//! an ephemeral port (see [`DeviceServer`]) or launched as a subprocess and
//! monitored by [`DeviceServerProcess`].

#![deny(missing_docs)]

pub mod client;
mod errors;
mod resource;
mod server;
mod watcher;

pub use crate::{
    errors::{ClientError, RequestError, WatcherError, FAILURE_MODE_MESSAGE},
    resource::ResourceStore,
    server::{DeviceServer, DeviceServerBuilder},
    watcher::{DeviceServerProcess, Host, LocalHost, DEFAULT_PORT, POLL_INTERVAL},
};
