// Copyright 2026 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    anyhow::{Context as _, Error},
    argh::FromArgs,
    log::info,
    mock_device_server::DeviceServer,
    std::net::{IpAddr, Ipv4Addr, SocketAddr},
};

/// Mock cloud device registration server for integration tests.
#[derive(FromArgs, Debug, PartialEq)]
struct Args {
    /// generation token to report from the meta handler.
    #[argh(positional)]
    generation: String,

    /// port to listen on; 0 picks an ephemeral port.
    #[argh(option, default = "mock_device_server::DEFAULT_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let Args { generation, port } = argh::from_env();

    let server = DeviceServer::builder()
        .generation(generation)
        .addr(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port))
        .start()
        .context("starting mock device server")?;
    info!("mock device server listening on {}", server.addr());

    server.wait().await;
    Ok(())
}
