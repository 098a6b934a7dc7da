// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Construction context shared by the media.* methods.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::info;

use sparkling_bridge::{MethodRegistry, PermissionGate, PlatformHost};
use sparkling_core::ContainerConfig;
use sparkling_core::error::{Result, SparklingError};

use crate::choose::ChooseMedia;
use crate::dataurl::SaveDataUrl;
use crate::download::DownloadFile;
use crate::net::NetworkClient;
use crate::upload::UploadImage;

/// Everything a media method needs: where the cache lives, how to reach the
/// network, the permission gate, and the platform host. Bodies that do
/// blocking I/O run on the captured runtime handle, so `invoke` stays safe
/// to call from any thread.
pub struct MediaEnv {
    pub cache_dir: PathBuf,
    pub config: ContainerConfig,
    pub client: Arc<dyn NetworkClient>,
    pub gate: Arc<PermissionGate>,
    pub host: Arc<dyn PlatformHost>,
    pub runtime: Handle,
}

impl MediaEnv {
    /// Build the context and ensure the cache directory exists.
    ///
    /// Must be called from within a tokio runtime; the current handle is
    /// captured for spawning method bodies.
    pub fn new(
        cache_dir: PathBuf,
        config: ContainerConfig,
        client: Arc<dyn NetworkClient>,
        gate: Arc<PermissionGate>,
        host: Arc<dyn PlatformHost>,
    ) -> Result<Arc<Self>> {
        let runtime = Handle::try_current()
            .map_err(|e| SparklingError::Bridge(format!("no tokio runtime available: {e}")))?;
        std::fs::create_dir_all(&cache_dir)?;
        info!(cache_dir = %cache_dir.display(), platform = host.platform_name(), "media environment ready");
        Ok(Arc::new(Self {
            cache_dir,
            config,
            client,
            gate,
            host,
            runtime,
        }))
    }
}

/// Register the four `media.*` methods over one shared environment.
pub fn register_media_methods(registry: &MethodRegistry, env: Arc<MediaEnv>) {
    registry.register(Arc::new(DownloadFile::new(env.clone())));
    registry.register(Arc::new(UploadImage::new(env.clone())));
    registry.register(Arc::new(SaveDataUrl::new(env.clone())));
    registry.register(Arc::new(ChooseMedia::new(env)));
}
