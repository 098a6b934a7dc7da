// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// media.uploadImage — multipart upload of a local file.
//
// The HTTP status of the upstream server is part of the result, not a
// failure: a 4xx from the receiving endpoint is an answer, and the caller
// decides what to do with it. Only transport and local-file problems fail
// the call.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use sparkling_bridge::model::{
    FieldSpec, FieldType, ParamMap, ParamModel, ResultModel, Schema, SchemaViolation,
    opt_str_field, str_field,
};
use sparkling_bridge::{Completion, Method, MethodCall};
use sparkling_core::{MethodScope, MethodStatus};

use crate::download::decode_headers;
use crate::env::MediaEnv;
use crate::net::UploadRequest;

const UPLOAD_SCHEMA: Schema = Schema::new(&[
    FieldSpec::required("url", FieldType::Str),
    FieldSpec::required("filePath", FieldType::Str),
    FieldSpec::optional("formField", FieldType::Str),
    FieldSpec::optional("fileName", FieldType::Str),
    FieldSpec::optional("mimeType", FieldType::Str),
    FieldSpec::optional("headers", FieldType::Map),
]);

struct UploadParams {
    url: String,
    file_path: String,
    form_field: String,
    file_name: Option<String>,
    mime: Option<String>,
    headers: Vec<(String, String)>,
}

impl ParamModel for UploadParams {
    fn schema() -> &'static Schema {
        &UPLOAD_SCHEMA
    }

    fn decode(params: &ParamMap) -> std::result::Result<Self, SchemaViolation> {
        Ok(Self {
            url: str_field(params, "url")?,
            file_path: str_field(params, "filePath")?,
            form_field: opt_str_field(params, "formField")?.unwrap_or_else(|| "file".into()),
            file_name: opt_str_field(params, "fileName")?,
            mime: opt_str_field(params, "mimeType")?,
            headers: decode_headers(params)?,
        })
    }
}

/// Result of `media.uploadImage`.
pub struct UploadResult {
    pub http_status: u16,
    pub body: String,
}

impl ResultModel for UploadResult {
    fn model_name(&self) -> &'static str {
        "UploadResult"
    }

    fn encode(self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("httpStatus".into(), Value::from(self.http_status));
        map.insert("body".into(), Value::String(self.body));
        map
    }
}

pub struct UploadImage {
    env: Arc<MediaEnv>,
}

impl UploadImage {
    pub fn new(env: Arc<MediaEnv>) -> Self {
        Self { env }
    }
}

impl Method for UploadImage {
    fn name(&self) -> &str {
        "media.uploadImage"
    }

    fn scope(&self) -> MethodScope {
        MethodScope::Global
    }

    fn param_schema(&self) -> &'static Schema {
        UploadParams::schema()
    }

    fn result_model(&self) -> Option<&'static str> {
        Some("UploadResult")
    }

    fn invoke(&self, call: MethodCall, completion: Completion) {
        let params = match UploadParams::decode(&call.params) {
            Ok(params) => params,
            Err(violation) => {
                completion.complete(
                    MethodStatus::InvalidInputParameter(violation.to_string()),
                    None,
                );
                return;
            }
        };
        if !params.url.starts_with("http://") && !params.url.starts_with("https://") {
            completion.invalid(format!("unsupported URL scheme in '{}'", params.url));
            return;
        }

        let env = self.env.clone();
        self.env.runtime.spawn(async move {
            run_upload(env, params, completion).await;
        });
    }
}

async fn run_upload(env: Arc<MediaEnv>, params: UploadParams, completion: Completion) {
    let path = PathBuf::from(&params.file_path);
    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => {
            completion.fail(format!("'{}' is not a regular file", params.file_path));
            return;
        }
        Err(_) => {
            completion.fail(format!("file not found: {}", params.file_path));
            return;
        }
    }

    let file_name = params.file_name.clone().unwrap_or_else(|| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".into())
    });
    let request = UploadRequest {
        url: params.url.clone(),
        field: params.form_field,
        file_name,
        file_path: path,
        mime: params.mime,
        headers: params.headers,
    };

    match env.client.post_file(request).await {
        Ok(response) => {
            info!(url = %params.url, status = response.status, "upload complete");
            completion.succeed(UploadResult {
                http_status: response.status,
                body: response.body,
            });
        }
        Err(e) => {
            warn!(url = %params.url, error = %e, "upload failed");
            completion.fail(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::UploadResponse;
    use crate::test_support::{invoke, media_fixture};
    use serde_json::json;
    use sparkling_bridge::GrantAllPermissions;

    #[tokio::test]
    async fn upload_surfaces_status_and_body() {
        let media = media_fixture(Arc::new(GrantAllPermissions));
        let file = media.dir.path().join("photo.jpg");
        std::fs::write(&file, b"jpeg bytes").expect("write fixture");
        media.client.push_upload(Ok(UploadResponse {
            status: 201,
            body: "{\"id\":\"42\"}".into(),
        }));

        let (status, data) = invoke(
            &media.pipe,
            "media.uploadImage",
            json!({
                "url": "https://example.com/upload",
                "filePath": file.display().to_string(),
                "mimeType": "image/jpeg",
            }),
        )
        .await;

        assert!(status.is_success());
        let data = data.expect("data");
        assert_eq!(data["httpStatus"], json!(201));
        assert_eq!(data["body"], json!("{\"id\":\"42\"}"));

        let uploads = media.client.uploads.lock().expect("lock");
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].field, "file");
        assert_eq!(uploads[0].file_name, "photo.jpg");
        assert_eq!(uploads[0].mime.as_deref(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn explicit_form_field_and_name_are_forwarded() {
        let media = media_fixture(Arc::new(GrantAllPermissions));
        let file = media.dir.path().join("raw.bin");
        std::fs::write(&file, b"data").expect("write fixture");
        media.client.push_upload(Ok(UploadResponse {
            status: 200,
            body: String::new(),
        }));

        let (status, _) = invoke(
            &media.pipe,
            "media.uploadImage",
            json!({
                "url": "https://example.com/upload",
                "filePath": file.display().to_string(),
                "formField": "attachment",
                "fileName": "renamed.bin",
            }),
        )
        .await;

        assert!(status.is_success());
        let uploads = media.client.uploads.lock().expect("lock");
        assert_eq!(uploads[0].field, "attachment");
        assert_eq!(uploads[0].file_name, "renamed.bin");
    }

    #[tokio::test]
    async fn missing_file_fails_without_a_request() {
        let media = media_fixture(Arc::new(GrantAllPermissions));

        let (status, data) = invoke(
            &media.pipe,
            "media.uploadImage",
            json!({
                "url": "https://example.com/upload",
                "filePath": "/no/such/file.png",
            }),
        )
        .await;

        assert_eq!(status.code(), 1);
        assert!(status.message().contains("file not found"));
        assert!(data.is_none());
        assert!(media.client.uploads.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn transport_errors_fail_the_call() {
        let media = media_fixture(Arc::new(GrantAllPermissions));
        let file = media.dir.path().join("photo.png");
        std::fs::write(&file, b"png").expect("write fixture");
        media.client.push_upload(Err(
            sparkling_core::SparklingError::Http("connection refused".into()),
        ));

        let (status, _) = invoke(
            &media.pipe,
            "media.uploadImage",
            json!({
                "url": "https://example.com/upload",
                "filePath": file.display().to_string(),
            }),
        )
        .await;

        assert_eq!(status.code(), 1);
        assert!(status.message().contains("connection refused"));
    }

    #[tokio::test]
    async fn missing_file_path_is_a_schema_violation() {
        let media = media_fixture(Arc::new(GrantAllPermissions));

        let (status, _) = invoke(
            &media.pipe,
            "media.uploadImage",
            json!({"url": "https://example.com/upload"}),
        )
        .await;

        assert_eq!(status.code(), 3);
        assert!(status.message().contains("filePath"));
    }
}
