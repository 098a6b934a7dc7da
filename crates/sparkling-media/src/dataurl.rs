// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// media.saveDataURL — decode a base64 data URL into the cache directory.
//
// Targets are created exclusively, so a name collision fails the call
// instead of overwriting an earlier save, even between in-flight calls.

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use sparkling_bridge::model::{
    FieldSpec, FieldType, ParamMap, ParamModel, ResultModel, Schema, SchemaViolation,
    opt_str_field, str_field,
};
use sparkling_bridge::{Completion, Method, MethodCall};
use sparkling_core::{MethodScope, MethodStatus};
use sparkling_storage::short_hash;

use crate::env::MediaEnv;

const SAVE_DATA_URL_SCHEMA: Schema = Schema::new(&[
    FieldSpec::required("dataURL", FieldType::Str),
    FieldSpec::optional("filename", FieldType::Str),
]);

struct SaveDataUrlParams {
    data_url: String,
    filename: Option<String>,
}

impl ParamModel for SaveDataUrlParams {
    fn schema() -> &'static Schema {
        &SAVE_DATA_URL_SCHEMA
    }

    fn decode(params: &ParamMap) -> std::result::Result<Self, SchemaViolation> {
        Ok(Self {
            data_url: str_field(params, "dataURL")?,
            filename: opt_str_field(params, "filename")?,
        })
    }
}

/// Result of `media.saveDataURL`.
pub struct SavedFileResult {
    pub file_path: String,
    pub size_bytes: u64,
}

impl ResultModel for SavedFileResult {
    fn model_name(&self) -> &'static str {
        "SavedFileResult"
    }

    fn encode(self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("filePath".into(), Value::String(self.file_path));
        map.insert("sizeBytes".into(), Value::from(self.size_bytes));
        map
    }
}

#[derive(Debug)]
struct ParsedDataUrl {
    mime: Option<String>,
    bytes: Vec<u8>,
}

/// Parse `data:[<mime>];base64,<payload>`. Anything that is not a base64
/// data URL is rejected with a caller-facing reason.
fn parse_data_url(input: &str) -> std::result::Result<ParsedDataUrl, String> {
    let rest = input
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URL".to_string())?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URL has no ',' separator".to_string())?;
    let Some(meta) = meta.strip_suffix(";base64") else {
        return Err("only base64 data URLs are supported".to_string());
    };
    let mime = if meta.is_empty() {
        None
    } else {
        Some(meta.to_string())
    };
    let bytes = BASE64
        .decode(payload.trim().as_bytes())
        .map_err(|e| format!("invalid base64 payload: {e}"))?;
    Ok(ParsedDataUrl { mime, bytes })
}

fn extension_for_mime(mime: Option<&str>) -> &'static str {
    match mime {
        Some("image/png") => "png",
        Some("image/jpeg" | "image/jpg") => "jpg",
        Some("image/gif") => "gif",
        Some("image/webp") => "webp",
        Some("image/svg+xml") => "svg",
        Some("text/plain") => "txt",
        Some("application/json") => "json",
        Some("application/pdf") => "pdf",
        _ => "bin",
    }
}

pub struct SaveDataUrl {
    env: Arc<MediaEnv>,
}

impl SaveDataUrl {
    pub fn new(env: Arc<MediaEnv>) -> Self {
        Self { env }
    }
}

impl Method for SaveDataUrl {
    fn name(&self) -> &str {
        "media.saveDataURL"
    }

    fn scope(&self) -> MethodScope {
        MethodScope::Global
    }

    fn param_schema(&self) -> &'static Schema {
        SaveDataUrlParams::schema()
    }

    fn result_model(&self) -> Option<&'static str> {
        Some("SavedFileResult")
    }

    fn invoke(&self, call: MethodCall, completion: Completion) {
        let params = match SaveDataUrlParams::decode(&call.params) {
            Ok(params) => params,
            Err(violation) => {
                completion.complete(
                    MethodStatus::InvalidInputParameter(violation.to_string()),
                    None,
                );
                return;
            }
        };
        let parsed = match parse_data_url(&params.data_url) {
            Ok(parsed) => parsed,
            Err(reason) => {
                completion.invalid(reason);
                return;
            }
        };

        let file_name = match params.filename {
            Some(name) => {
                if name.contains(['/', '\\']) || name.contains("..") || name.is_empty() {
                    completion.invalid(format!("filename '{name}' must be a bare file name"));
                    return;
                }
                name
            }
            None => format!(
                "{}.{}",
                short_hash(&parsed.bytes),
                extension_for_mime(parsed.mime.as_deref())
            ),
        };

        let target = self.env.cache_dir.join(file_name);
        self.env.runtime.spawn(async move {
            let size_bytes = parsed.bytes.len() as u64;
            match write_new(&target, &parsed.bytes).await {
                Ok(()) => {
                    info!(path = %target.display(), size_bytes, "data URL saved");
                    completion.succeed(SavedFileResult {
                        file_path: target.display().to_string(),
                        size_bytes,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    // The target belongs to an earlier or concurrent call.
                    completion.fail("file path already exist");
                }
                Err(e) => {
                    if let Err(cleanup) = tokio::fs::remove_file(&target).await {
                        if cleanup.kind() != std::io::ErrorKind::NotFound {
                            warn!(
                                path = %target.display(),
                                error = %cleanup,
                                "could not remove partial save"
                            );
                        }
                    }
                    completion.fail(format!("could not write '{}': {e}", target.display()));
                }
            }
        });
    }
}

/// Write to a path that must not exist yet. The exclusive create is the
/// authoritative no-overwrite check, so two in-flight saves of one target
/// cannot both succeed.
async fn write_new(target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{invoke, media_fixture};
    use serde_json::json;
    use sparkling_bridge::GrantAllPermissions;

    // "hi there" in base64.
    const HI_THERE: &str = "data:text/plain;base64,aGkgdGhlcmU=";

    #[test]
    fn parses_mime_and_payload() {
        let parsed = parse_data_url(HI_THERE).expect("parse");
        assert_eq!(parsed.mime.as_deref(), Some("text/plain"));
        assert_eq!(parsed.bytes, b"hi there");
    }

    #[test]
    fn mime_is_optional() {
        let parsed = parse_data_url("data:;base64,aGk=").expect("parse");
        assert!(parsed.mime.is_none());
        assert_eq!(parsed.bytes, b"hi");
    }

    #[test]
    fn non_base64_encoding_is_rejected() {
        let err = parse_data_url("data:text/plain,plain%20text").expect_err("must reject");
        assert!(err.contains("base64"));
    }

    #[tokio::test]
    async fn saves_decoded_bytes_under_a_content_hash() {
        let media = media_fixture(Arc::new(GrantAllPermissions));

        let (status, data) = invoke(
            &media.pipe,
            "media.saveDataURL",
            json!({"dataURL": HI_THERE}),
        )
        .await;

        assert!(status.is_success());
        let data = data.expect("data");
        assert_eq!(data["sizeBytes"], json!(8));
        let path = data["filePath"].as_str().expect("path");
        assert!(path.ends_with(".txt"));
        assert_eq!(std::fs::read(path).expect("read"), b"hi there");
    }

    #[tokio::test]
    async fn explicit_filename_is_honoured() {
        let media = media_fixture(Arc::new(GrantAllPermissions));

        let (status, data) = invoke(
            &media.pipe,
            "media.saveDataURL",
            json!({"dataURL": HI_THERE, "filename": "note.txt"}),
        )
        .await;

        assert!(status.is_success());
        let path = data.expect("data")["filePath"]
            .as_str()
            .expect("path")
            .to_string();
        assert!(path.ends_with("note.txt"));
    }

    #[tokio::test]
    async fn filenames_with_separators_are_invalid() {
        let media = media_fixture(Arc::new(GrantAllPermissions));

        let (status, _) = invoke(
            &media.pipe,
            "media.saveDataURL",
            json!({"dataURL": HI_THERE, "filename": "../escape.txt"}),
        )
        .await;

        assert_eq!(status.code(), 2);
    }

    #[tokio::test]
    async fn malformed_data_urls_are_invalid_parameters() {
        let media = media_fixture(Arc::new(GrantAllPermissions));

        for bad in [
            "https://example.com/a.png",
            "data:text/plain;base64",
            "data:text/plain;base64,!!!not-base64!!!",
        ] {
            let (status, data) =
                invoke(&media.pipe, "media.saveDataURL", json!({"dataURL": bad})).await;
            assert_eq!(status.code(), 2, "input: {bad}");
            assert!(data.is_none());
        }
    }

    #[tokio::test]
    async fn duplicate_content_does_not_overwrite() {
        let media = media_fixture(Arc::new(GrantAllPermissions));

        let (status, _) = invoke(
            &media.pipe,
            "media.saveDataURL",
            json!({"dataURL": HI_THERE}),
        )
        .await;
        assert!(status.is_success());

        let (status, _) = invoke(
            &media.pipe,
            "media.saveDataURL",
            json!({"dataURL": HI_THERE}),
        )
        .await;
        assert_eq!(status, MethodStatus::Failed("file path already exist".into()));
    }

    #[tokio::test]
    async fn in_flight_saves_of_one_filename_write_exactly_once() {
        let media = media_fixture(Arc::new(GrantAllPermissions));

        // Both calls are in flight before either completion is awaited;
        // the payloads differ so a silent overwrite would be visible.
        let (tx_a, rx_a) = tokio::sync::oneshot::channel();
        media.pipe.invoke(
            "media.saveDataURL",
            json!({"dataURL": "data:text/plain;base64,Zmlyc3Q=", "filename": "note.txt"}),
            move |status, data| {
                let _ = tx_a.send((status, data));
            },
        );
        let (tx_b, rx_b) = tokio::sync::oneshot::channel();
        media.pipe.invoke(
            "media.saveDataURL",
            json!({"dataURL": "data:text/plain;base64,c2Vjb25k", "filename": "note.txt"}),
            move |status, data| {
                let _ = tx_b.send((status, data));
            },
        );

        let (status_a, data_a) = rx_a.await.expect("first completion");
        let (status_b, data_b) = rx_b.await.expect("second completion");

        // Exactly one write lands; the other call reports the collision.
        let (winner_data, winner_bytes, loser) = if status_a.is_success() {
            (data_a, b"first".as_slice(), &status_b)
        } else {
            assert!(status_b.is_success());
            (data_b, b"second".as_slice(), &status_a)
        };
        assert_eq!(
            *loser,
            MethodStatus::Failed("file path already exist".into())
        );
        let path = winner_data.expect("data")["filePath"]
            .as_str()
            .expect("path")
            .to_string();
        assert!(path.ends_with("note.txt"));
        assert_eq!(std::fs::read(&path).expect("read"), winner_bytes);
    }
}
