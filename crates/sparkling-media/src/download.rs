// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// media.downloadFile — stream a URL into the cache directory.
//
// The cache file name is derived from the URL alone, so it is known before
// any I/O starts and repeat calls collide deterministically. An existing
// file at that path fails the call rather than being overwritten. The body
// claims a `.part` sidecar with an exclusive create, so of two racing calls
// for one target exactly one proceeds. It streams into the sidecar and
// renames only after a full, error-free stream; any failure removes the
// sidecar. The optional album copy runs last, behind the photo library
// permission gate.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use sparkling_bridge::model::{
    FieldSpec, FieldType, ParamMap, ParamModel, ResultModel, Schema, SchemaViolation,
    bool_field_or, json_type_name, opt_map_field, opt_str_field, str_field,
};
use sparkling_bridge::{Completion, Method, MethodCall, PermissionDecision};
use sparkling_core::error::{Result, SparklingError};
use sparkling_core::{Capability, MethodScope, MethodStatus};
use sparkling_storage::short_hash;

use crate::env::MediaEnv;
use crate::net::HttpRequest;

const DOWNLOAD_SCHEMA: Schema = Schema::new(&[
    FieldSpec::required("url", FieldType::Str),
    FieldSpec::optional("extension", FieldType::Str),
    FieldSpec::optional("saveToAlbum", FieldType::Bool),
    FieldSpec::optional("headers", FieldType::Map),
]);

pub(crate) struct DownloadParams {
    pub url: String,
    pub extension: Option<String>,
    pub save_to_album: bool,
    pub headers: Vec<(String, String)>,
}

impl ParamModel for DownloadParams {
    fn schema() -> &'static Schema {
        &DOWNLOAD_SCHEMA
    }

    fn decode(params: &ParamMap) -> std::result::Result<Self, SchemaViolation> {
        Ok(Self {
            url: str_field(params, "url")?,
            extension: opt_str_field(params, "extension")?,
            save_to_album: bool_field_or(params, "saveToAlbum", false)?,
            headers: decode_headers(params)?,
        })
    }
}

/// Decode an optional `headers` object into name/value pairs. Values must
/// all be strings.
pub(crate) fn decode_headers(
    params: &ParamMap,
) -> std::result::Result<Vec<(String, String)>, SchemaViolation> {
    let Some(map) = opt_map_field(params, "headers")? else {
        return Ok(Vec::new());
    };
    let mut headers = Vec::with_capacity(map.len());
    for (name, value) in map {
        match value {
            Value::String(value) => headers.push((name, value)),
            other => {
                return Err(SchemaViolation::invalid(
                    "headers",
                    format!(
                        "value for '{name}' must be a string, got {}",
                        json_type_name(&other)
                    ),
                ));
            }
        }
    }
    Ok(headers)
}

/// Result of `media.downloadFile`.
pub struct DownloadResult {
    pub file_path: String,
    pub size_bytes: u64,
    pub http_status: u16,
}

impl ResultModel for DownloadResult {
    fn model_name(&self) -> &'static str {
        "DownloadResult"
    }

    fn encode(self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("filePath".into(), Value::String(self.file_path));
        map.insert("sizeBytes".into(), Value::from(self.size_bytes));
        map.insert("httpStatus".into(), Value::from(self.http_status));
        map
    }
}

pub struct DownloadFile {
    env: Arc<MediaEnv>,
}

impl DownloadFile {
    pub fn new(env: Arc<MediaEnv>) -> Self {
        Self { env }
    }
}

impl Method for DownloadFile {
    fn name(&self) -> &str {
        "media.downloadFile"
    }

    fn scope(&self) -> MethodScope {
        MethodScope::Global
    }

    fn param_schema(&self) -> &'static Schema {
        DownloadParams::schema()
    }

    fn result_model(&self) -> Option<&'static str> {
        Some("DownloadResult")
    }

    fn invoke(&self, call: MethodCall, completion: Completion) {
        let params = match DownloadParams::decode(&call.params) {
            Ok(params) => params,
            Err(violation) => {
                completion.complete(
                    MethodStatus::InvalidInputParameter(violation.to_string()),
                    None,
                );
                return;
            }
        };
        if !has_http_scheme(&params.url) {
            completion.invalid(format!("unsupported URL scheme in '{}'", params.url));
            return;
        }

        let target = self
            .env
            .cache_dir
            .join(cache_file_name(&params.url, params.extension.as_deref()));
        if target.exists() {
            // A completed earlier call produced this path; never overwrite
            // it. In-flight duplicates are caught by the sidecar claim.
            completion.fail("file path already exist");
            return;
        }

        let env = self.env.clone();
        self.env.runtime.spawn(async move {
            run_download(env, params, target, completion).await;
        });
    }
}

fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Cache file name for a URL: hash of the URL string plus the normalised
/// extension. No random or time component, so the name is computable before
/// any I/O.
fn cache_file_name(url: &str, extension: Option<&str>) -> String {
    format!(
        "{}.{}",
        short_hash(url.as_bytes()),
        normalise_extension(url, extension)
    )
}

fn normalise_extension(url: &str, explicit: Option<&str>) -> String {
    let raw = explicit
        .map(str::to_owned)
        .or_else(|| extension_from_url(url))
        .unwrap_or_default();
    let cleaned: String = raw
        .trim_start_matches('.')
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    if cleaned.is_empty() { "bin".into() } else { cleaned }
}

fn extension_from_url(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let after_scheme = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| rest);
    let (_host, path) = after_scheme.split_once('/')?;
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext.to_string())
    }
}

fn part_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

async fn run_download(
    env: Arc<MediaEnv>,
    params: DownloadParams,
    target: PathBuf,
    completion: Completion,
) {
    let part_path = part_path_for(&target);
    // The exclusive create is the authoritative no-overwrite check: of two
    // in-flight calls for one target, exactly one owns the sidecar. The
    // loser fails here, before any network I/O, and must not touch the
    // winner's file.
    let part_file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&part_path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            completion.fail("file path already exist");
            return;
        }
        Err(e) => {
            warn!(path = %part_path.display(), error = %e, "could not create download sidecar");
            completion.fail(format!("could not create '{}': {e}", part_path.display()));
            return;
        }
    };

    match stream_to_file(&env, &params, part_file, &target, &part_path).await {
        Ok((size_bytes, http_status)) => {
            info!(url = %params.url, path = %target.display(), size_bytes, "download complete");
            let result = DownloadResult {
                file_path: target.display().to_string(),
                size_bytes,
                http_status,
            };
            if params.save_to_album {
                album_copy(env, target, result, completion);
            } else {
                completion.succeed(result);
            }
        }
        Err(e) => {
            warn!(url = %params.url, error = %e, "download failed");
            if let Err(cleanup) = tokio::fs::remove_file(&part_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(
                        path = %part_path.display(),
                        error = %cleanup,
                        "could not remove partial download"
                    );
                }
            }
            completion.fail(e.to_string());
        }
    }
}

/// Stream the response body into the claimed `.part` sidecar and rename on
/// success. Returns bytes written and the upstream HTTP status.
async fn stream_to_file(
    env: &MediaEnv,
    params: &DownloadParams,
    part_file: tokio::fs::File,
    target: &Path,
    part_path: &Path,
) -> Result<(u64, u16)> {
    let mut request = HttpRequest::get(&params.url);
    for (name, value) in &params.headers {
        request = request.header(name, value);
    }
    let mut response = env.client.fetch(request).await?;
    if !(200..300).contains(&response.status) {
        return Err(SparklingError::Http(format!(
            "server returned HTTP {}",
            response.status
        )));
    }

    let chunk_timeout = Duration::from_secs(env.config.http_timeout_secs);
    let limit = env.config.max_download_bytes;
    let mut writer = BufWriter::with_capacity(env.config.download_chunk_bytes, part_file);
    let mut written: u64 = 0;
    loop {
        let chunk = tokio::time::timeout(chunk_timeout, response.body.next_chunk())
            .await
            .map_err(|_| {
                SparklingError::Http(format!(
                    "body read timed out after {}s",
                    env.config.http_timeout_secs
                ))
            })??;
        let Some(chunk) = chunk else { break };
        written += chunk.len() as u64;
        if written > limit {
            return Err(SparklingError::DownloadTooLarge { limit });
        }
        writer.write_all(&chunk).await?;
        debug!(written, "download progress");
    }
    writer.flush().await?;
    let file = writer.into_inner();
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(part_path, target).await?;

    Ok((written, response.status))
}

/// Copy a finished download into the photo album, behind the permission
/// gate. The cache file stays either way; only the album copy is gated.
fn album_copy(
    env: Arc<MediaEnv>,
    path: PathBuf,
    result: DownloadResult,
    completion: Completion,
) {
    let host = env.host.clone();
    env.gate.run(Capability::PhotoLibrary, move |decision| match decision {
        PermissionDecision::Granted => match host.save_to_album(&path) {
            Ok(()) => completion.succeed(result),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "album copy failed");
                completion.fail(format!("saved to cache but album copy failed: {e}"));
            }
        },
        PermissionDecision::Denied => completion.deny("photo library permission denied"),
        PermissionDecision::RequestPending => {
            completion.fail("a photo library permission request is already pending");
        }
    });
}
