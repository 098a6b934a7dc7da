// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line-delimited JSON console over stdin/stdout.
//
// One request per line: {"id": "...", "method": "...", "params": {...}}.
// Every request is answered with exactly one {"id", "code", "message",
// "data"} line; events fired by method bodies appear as standalone
// {"event", "params"} lines. EOF ends the session. Requests are served one
// at a time: the line protocol has no frame interleaving.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

use sparkling_bridge::EventEngine;
use sparkling_core::error::Result;
use sparkling_core::{CallId, MethodStatus, WireResponse};

use crate::services::container_services::ContainerServices;

#[derive(Debug, Deserialize)]
struct RequestFrame {
    #[serde(default)]
    id: Option<String>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct ResponseFrame {
    id: String,
    #[serde(flatten)]
    response: WireResponse,
}

#[derive(Debug, Serialize)]
struct EventFrame<'a> {
    event: &'a str,
    params: &'a Value,
}

/// Event engine that prints event frames to stdout. `println!` is
/// line-atomic, so event lines never tear response lines.
struct ConsoleEventEngine {
    log_events: bool,
}

impl EventEngine for ConsoleEventEngine {
    fn fire_event(&self, name: &str, params: Value) {
        if self.log_events {
            info!(event = name, "event fired");
        }
        let frame = EventFrame {
            event: name,
            params: &params,
        };
        match serde_json::to_string(&frame) {
            Ok(line) => println!("{line}"),
            Err(e) => debug!(event = name, error = %e, "unserialisable event dropped"),
        }
    }
}

/// Run the console loop until stdin closes.
pub async fn run(services: ContainerServices) -> Result<()> {
    let pipe = services.new_container("console");
    pipe.attach_engine(Arc::new(ConsoleEventEngine {
        log_events: services.config().event_log_enabled,
    }));
    info!(methods = services.method_names().len(), "console ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request: RequestFrame = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                emit(ResponseFrame {
                    id: String::new(),
                    response: WireResponse::from_completion(
                        &MethodStatus::Failed(format!("unparseable request: {e}")),
                        None,
                    ),
                });
                continue;
            }
        };
        let id = request.id.unwrap_or_else(|| CallId::new().to_string());

        let (tx, rx) = tokio::sync::oneshot::channel();
        pipe.invoke(&request.method, request.params, move |status, data| {
            let _ = tx.send(WireResponse::from_completion(&status, data));
        });
        let response = rx.await.unwrap_or_else(|_| {
            WireResponse::from_completion(
                &MethodStatus::Failed("completion dropped without firing".into()),
                None,
            )
        });
        emit(ResponseFrame { id, response });
    }

    info!("console session ended");
    Ok(())
}

fn emit(frame: ResponseFrame) {
    match serde_json::to_string(&frame) {
        Ok(line) => println!("{line}"),
        Err(e) => error!(error = %e, "unserialisable response dropped"),
    }
}
