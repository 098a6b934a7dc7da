// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sparkling — Hybrid App Container
//
// Entry point. Initialises logging and backend services, then serves method
// calls over a line-delimited JSON console on stdin/stdout. Platform shells
// embed the library crates directly; this binary is the desktop/debug
// front-end.

mod console;
mod services;

use services::container_services::ContainerServices;
use services::data_dir;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Sparkling starting");

    let services = match ContainerServices::init(data_dir::data_dir()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "service initialisation failed");
            std::process::exit(1);
        }
    };

    if let Err(e) = console::run(services).await {
        tracing::error!(error = %e, "console session failed");
        std::process::exit(1);
    }
}
