// Copyright 2026 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    assert_matches::assert_matches,
    mock_device_server::{client::MetaClient, DeviceServerProcess, Host, WatcherError},
    std::{io, path::Path, time::Duration},
    tokio::process::{Child, Command},
};

const SERVER_BIN: &str = env!("CARGO_BIN_EXE_mock-device-server");

// Each test uses its own port so they can run concurrently.

#[tokio::test]
async fn start_observes_generation_token() {
    let mut server = DeviceServerProcess::with_port(SERVER_BIN, 9931);
    server.start(Duration::from_secs(30)).await.expect("server to come up");

    let meta = MetaClient::new(server.url());
    assert_eq!(meta.generation().await.unwrap(), server.generation());

    server.close().await.unwrap();
}

#[tokio::test]
async fn restarted_server_reports_a_fresh_token() {
    let mut first = DeviceServerProcess::with_port(SERVER_BIN, 9932);
    first.start(Duration::from_secs(30)).await.expect("first server to come up");
    let first_token = first.generation().to_string();
    first.close().await.unwrap();

    let mut second = DeviceServerProcess::with_port(SERVER_BIN, 9933);
    second.start(Duration::from_secs(30)).await.expect("second server to come up");
    assert_ne!(second.generation(), first_token);
    second.close().await.unwrap();
}

/// Stand-in for a remote host: wraps the launch in a shell the way an
/// ssh-backed implementation would wrap it in ssh.
struct ShellHost;

impl Host for ShellHost {
    fn spawn(&self, program: &Path, args: &[String]) -> io::Result<Child> {
        Command::new("sh")
            .arg("-c")
            .arg(format!("exec {} \"$@\"", program.display()))
            .arg("sh")
            .args(args)
            .kill_on_drop(true)
            .spawn()
    }
}

#[tokio::test]
async fn custom_host_launches_the_server() {
    let mut server =
        DeviceServerProcess::with_host(SERVER_BIN, Box::new(ShellHost), 9935);
    server.start(Duration::from_secs(30)).await.expect("server to come up");

    let meta = MetaClient::new(server.url());
    assert_eq!(meta.generation().await.unwrap(), server.generation());

    server.close().await.unwrap();
}

#[tokio::test]
async fn start_times_out_when_token_never_matches() {
    // `true` exits immediately without ever serving the meta handler.
    let mut server = DeviceServerProcess::with_port("true", 9934);
    assert_matches!(
        server.start(Duration::from_secs(2)).await,
        Err(WatcherError::StartupTimeout { .. })
    );
}
