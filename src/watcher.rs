// Copyright 2026 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Test-side helper that launches the server binary and confirms it is live.

use {
    crate::{client::MetaClient, errors::WatcherError},
    log::{debug, info, warn},
    std::{
        io,
        path::{Path, PathBuf},
        time::Duration,
    },
    tokio::{
        process::{Child, Command},
        time::{sleep, Instant},
    },
    uuid::Uuid,
};

/// Port the standalone server binary listens on by default.
pub const DEFAULT_PORT: u16 = 9876;

/// Interval between liveness polls of the `meta` handler.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Where the server subprocess runs.
///
/// The default [`LocalHost`] spawns directly on this machine. A lab harness
/// can substitute an implementation that wraps the invocation in e.g. ssh;
/// whatever it spawns must end up reachable on the watcher's port (remote
/// implementations are expected to forward it).
pub trait Host: Send + Sync {
    /// Spawns `program` with `args`, returning the child handle.
    fn spawn(&self, program: &Path, args: &[String]) -> io::Result<Child>;
}

/// Spawns the server on the local machine.
pub struct LocalHost;

impl Host for LocalHost {
    fn spawn(&self, program: &Path, args: &[String]) -> io::Result<Child> {
        Command::new(program).args(args).kill_on_drop(true).spawn()
    }
}

/// Launches the mock device server as a subprocess and polls its `meta`
/// handler until the subprocess reports the generation token it was launched
/// with.
///
/// There are no partial-success states: if [`DeviceServerProcess::start`]
/// times out the subprocess has been killed and the watcher must not be
/// reused.
pub struct DeviceServerProcess {
    program: PathBuf,
    host: Box<dyn Host>,
    port: u16,
    generation: String,
    child: Option<Child>,
}

impl DeviceServerProcess {
    /// Creates a watcher for the server binary at `program` on
    /// [`DEFAULT_PORT`], with a fresh UUIDv4 generation token.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_port(program, DEFAULT_PORT)
    }

    /// Creates a watcher serving on the given port.
    pub fn with_port(program: impl Into<PathBuf>, port: u16) -> Self {
        Self::with_host(program, Box::new(LocalHost), port)
    }

    /// Creates a watcher that launches the server through `host`.
    pub fn with_host(program: impl Into<PathBuf>, host: Box<dyn Host>, port: u16) -> Self {
        Self {
            program: program.into(),
            host,
            port,
            generation: Uuid::new_v4().to_string(),
            child: None,
        }
    }

    /// The generation token the subprocess is expected to report.
    pub fn generation(&self) -> &str {
        &self.generation
    }

    /// Base URL of the subprocess's HTTP surface.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// Spawns the server subprocess and polls `meta/generation` once per
    /// second until it reports the expected token. Kills the subprocess and
    /// fails with [`WatcherError::StartupTimeout`] when `timeout` elapses
    /// first.
    pub async fn start(&mut self, timeout: Duration) -> Result<(), WatcherError> {
        let args =
            vec![self.generation.clone(), "--port".to_string(), self.port.to_string()];
        let child = self.host.spawn(&self.program, &args)?;
        self.child = Some(child);

        let meta = MetaClient::new(self.url());
        let deadline = Instant::now() + timeout;
        loop {
            match meta.generation().await {
                Ok(token) if token == self.generation => {
                    info!("mock device server live at {}", self.url());
                    return Ok(());
                }
                // A previous instance still bound to the port, or a foreign
                // server entirely; keep polling until ours answers.
                Ok(token) => warn!("server reported stale generation {}", token),
                Err(e) => debug!("generation poll failed: {}", e),
            }
            if Instant::now() >= deadline {
                self.close().await?;
                return Err(WatcherError::StartupTimeout { timeout });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Terminates the subprocess. Idempotent.
    pub async fn close(&mut self) -> Result<(), WatcherError> {
        if let Some(mut child) = self.child.take() {
            match child.kill().await {
                Ok(()) => {}
                // The child exited on its own; all that is left is to reap it.
                Err(e) if e.kind() == io::ErrorKind::InvalidInput => {
                    let _ = child.wait().await;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
