// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — initialises all backend subsystems and hands out
// per-container method pipes.
//
// The KvStore is `Send` but not `Sync`, so it is wrapped in `Arc<Mutex<>>`
// for sharing across method bodies. Mutex contention is minimal because
// every operation is a fast single-row SQLite query.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{info, warn};

use sparkling_bridge::{
    DenyAllPermissions, MethodPipe, MethodRegistry, PermissionGate, PermissionProvider,
    PlatformHost, StubHost,
};
use sparkling_core::ContainerConfig;
use sparkling_core::error::Result;
use sparkling_media::{MediaEnv, ReqwestClient, register_media_methods};
use sparkling_storage::{KvStore, register_storage_methods};

/// Shared application services. All fields are cheaply cloneable so the
/// struct can be passed into closures and spawned tasks without lifetime
/// issues.
#[derive(Clone)]
pub struct ContainerServices {
    global: Arc<MethodRegistry>,
    config: ContainerConfig,
    data_dir: PathBuf,
}

impl ContainerServices {
    /// Initialise all services with the desktop defaults: a stub platform
    /// host and a provider that denies every permission prompt.
    ///
    /// Must be called inside the tokio runtime; method bodies are spawned
    /// onto the current handle.
    pub fn init(data_dir: PathBuf) -> Result<Self> {
        Self::init_with(data_dir, Arc::new(DenyAllPermissions), Arc::new(StubHost))
    }

    /// Initialise with a real permission provider and platform host.
    /// Platform shells call this with their native implementations.
    pub fn init_with(
        data_dir: PathBuf,
        permissions: Arc<dyn PermissionProvider>,
        host: Arc<dyn PlatformHost>,
    ) -> Result<Self> {
        info!(path = %data_dir.display(), "initialising container services");

        // Load persisted config or use defaults; write the defaults out on
        // first run so there is a file to edit.
        let config = match load_config(&data_dir) {
            Some(config) => config,
            None => {
                let config = ContainerConfig::default();
                if let Err(e) = persist_config(&data_dir, &config) {
                    warn!(error = %e, "could not write default config");
                }
                config
            }
        };

        let store = KvStore::open(data_dir.join("storage.db"))?;
        let store = Arc::new(Mutex::new(store));

        let client = Arc::new(ReqwestClient::new(Duration::from_secs(
            config.http_timeout_secs,
        ))?);
        let gate = Arc::new(PermissionGate::new(permissions));
        let cache_dir = data_dir.join(&config.cache_dir_name);
        let env = MediaEnv::new(cache_dir, config.clone(), client, gate, host)?;

        let global = Arc::new(MethodRegistry::new());
        register_storage_methods(&global, store);
        register_media_methods(&global, env);

        info!(methods = global.len(), "container services initialised");

        Ok(Self {
            global,
            config,
            data_dir,
        })
    }

    /// Create a method pipe for one container. Local registrations on the
    /// pipe shadow the shared global registry for that container only.
    pub fn new_container(&self, label: impl Into<String>) -> MethodPipe {
        MethodPipe::new(label, Arc::clone(&self.global))
    }

    /// Names of every globally registered method, sorted.
    pub fn method_names(&self) -> Vec<String> {
        self.global.method_names()
    }

    /// The active configuration.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Path to the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &Path) -> Option<ContainerConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&data).ok()
}

fn persist_config(data_dir: &Path, config: &ContainerConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
