// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Container configuration.

use serde::{Deserialize, Serialize};

/// Persistent container settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Connect/read timeout for outbound HTTP, in seconds.
    pub http_timeout_secs: u64,
    /// Size of each write when streaming a download to disk.
    pub download_chunk_bytes: usize,
    /// Hard cap on a single download (bytes). Exceeding it aborts the call.
    pub max_download_bytes: u64,
    /// Log every event fired through the bridge.
    pub event_log_enabled: bool,
    /// Name of the cache subdirectory under the data dir.
    pub cache_dir_name: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: 30,
            download_chunk_bytes: 64 * 1024,
            max_download_bytes: 512 * 1024 * 1024,
            event_log_enabled: true,
            cache_dir_name: "cache".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_json() {
        let config = ContainerConfig::default();
        let text = serde_json::to_string(&config).expect("serialize");
        let back: ContainerConfig = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back.http_timeout_secs, config.http_timeout_secs);
        assert_eq!(back.max_download_bytes, config.max_download_bytes);
        assert_eq!(back.cache_dir_name, config.cache_dir_name);
    }
}
