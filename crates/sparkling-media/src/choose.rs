// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// media.chooseMedia — present the native picker behind the permission gate.
//
// Camera sources gate on the camera capability, everything else on the
// photo library. Cancellation is its own outcome: the user closing the
// picker is not an error.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use sparkling_bridge::model::{
    FieldSpec, FieldType, ParamMap, ParamModel, ResultModel, Schema, SchemaViolation,
    opt_str_field, u32_field_or,
};
use sparkling_bridge::{
    Completion, Method, MethodCall, PermissionDecision, PickMediaType, PickOutcome, PickRequest,
    PickSource, PickedItem,
};
use sparkling_core::{Capability, MethodScope, MethodStatus};

use crate::env::MediaEnv;

const CHOOSE_SCHEMA: Schema = Schema::new(&[
    FieldSpec::optional("sourceType", FieldType::Str),
    FieldSpec::optional("mediaType", FieldType::Str),
    FieldSpec::optional("count", FieldType::Num),
]);

struct ChooseMediaParams {
    source_type: Option<String>,
    media_type: Option<String>,
    count: u32,
}

impl ParamModel for ChooseMediaParams {
    fn schema() -> &'static Schema {
        &CHOOSE_SCHEMA
    }

    fn decode(params: &ParamMap) -> std::result::Result<Self, SchemaViolation> {
        Ok(Self {
            source_type: opt_str_field(params, "sourceType")?,
            media_type: opt_str_field(params, "mediaType")?,
            count: u32_field_or(params, "count", 1)?,
        })
    }
}

/// Result of `media.chooseMedia`.
pub struct ChosenMediaResult {
    pub files: Vec<PickedItem>,
}

impl ResultModel for ChosenMediaResult {
    fn model_name(&self) -> &'static str {
        "ChosenMediaResult"
    }

    fn encode(self) -> ParamMap {
        let files = self
            .files
            .into_iter()
            .map(|item| {
                let mut entry = ParamMap::new();
                entry.insert("path".into(), Value::String(item.path));
                entry.insert("sizeBytes".into(), Value::from(item.size_bytes));
                if let Some(mime) = item.mime {
                    entry.insert("mime".into(), Value::String(mime));
                }
                Value::Object(entry)
            })
            .collect();
        let mut map = ParamMap::new();
        map.insert("files".into(), Value::Array(files));
        map
    }
}

pub struct ChooseMedia {
    env: Arc<MediaEnv>,
}

impl ChooseMedia {
    pub fn new(env: Arc<MediaEnv>) -> Self {
        Self { env }
    }
}

impl Method for ChooseMedia {
    fn name(&self) -> &str {
        "media.chooseMedia"
    }

    fn scope(&self) -> MethodScope {
        MethodScope::Global
    }

    fn param_schema(&self) -> &'static Schema {
        ChooseMediaParams::schema()
    }

    fn result_model(&self) -> Option<&'static str> {
        Some("ChosenMediaResult")
    }

    fn invoke(&self, call: MethodCall, completion: Completion) {
        let params = match ChooseMediaParams::decode(&call.params) {
            Ok(params) => params,
            Err(violation) => {
                completion.complete(
                    MethodStatus::InvalidInputParameter(violation.to_string()),
                    None,
                );
                return;
            }
        };

        let source = match params.source_type.as_deref() {
            None | Some("album") => PickSource::Library,
            Some("camera") => PickSource::Camera,
            Some(other) => {
                completion.invalid(format!("unknown sourceType '{other}'"));
                return;
            }
        };
        let media = match params.media_type.as_deref() {
            None | Some("image") => PickMediaType::Image,
            Some("video") => PickMediaType::Video,
            Some("all") => PickMediaType::Any,
            Some(other) => {
                completion.invalid(format!("unknown mediaType '{other}'"));
                return;
            }
        };
        if params.count == 0 {
            completion.invalid("count must be at least 1");
            return;
        }

        let capability = match source {
            PickSource::Camera => Capability::Camera,
            PickSource::Library => Capability::PhotoLibrary,
        };
        let request = PickRequest {
            source,
            media,
            count: params.count,
        };
        debug!(?request, capability = %capability, "presenting media picker");

        let host = self.env.host.clone();
        self.env.gate.run(capability, move |decision| match decision {
            PermissionDecision::Granted => {
                host.pick_media(
                    request,
                    Box::new(move |outcome| match outcome {
                        Ok(PickOutcome::Picked(files)) => {
                            completion.succeed(ChosenMediaResult { files });
                        }
                        Ok(PickOutcome::Cancelled) => {
                            completion.cancel("user cancelled media selection");
                        }
                        Err(e) => completion.fail(e.to_string()),
                    }),
                );
            }
            PermissionDecision::Denied => {
                completion.deny(format!("{capability} permission denied"));
            }
            PermissionDecision::RequestPending => {
                completion.fail(format!(
                    "a {capability} permission request is already pending"
                ));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{invoke, media_fixture};
    use serde_json::json;
    use sparkling_bridge::{DenyAllPermissions, GrantAllPermissions};

    #[tokio::test]
    async fn picked_files_come_back_as_a_list() {
        let media = media_fixture(Arc::new(GrantAllPermissions));
        media.host.script_pick(Ok(PickOutcome::Picked(vec![
            PickedItem {
                path: "/tmp/one.jpg".into(),
                size_bytes: 1024,
                mime: Some("image/jpeg".into()),
            },
            PickedItem {
                path: "/tmp/two.jpg".into(),
                size_bytes: 2048,
                mime: None,
            },
        ])));

        let (status, data) = invoke(&media.pipe, "media.chooseMedia", json!({})).await;

        assert!(status.is_success());
        let files = data.expect("data")["files"].as_array().expect("files").clone();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["path"], json!("/tmp/one.jpg"));
        assert_eq!(files[0]["mime"], json!("image/jpeg"));
        assert_eq!(files[1]["sizeBytes"], json!(2048));
        assert!(files[1].get("mime").is_none());
    }

    #[tokio::test]
    async fn defaults_are_album_image_single() {
        let media = media_fixture(Arc::new(GrantAllPermissions));
        media.host.script_pick(Ok(PickOutcome::Cancelled));

        let _ = invoke(&media.pipe, "media.chooseMedia", json!({})).await;

        let requests = media.host.pick_requests.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].source, PickSource::Library);
        assert_eq!(requests[0].media, PickMediaType::Image);
        assert_eq!(requests[0].count, 1);
    }

    #[tokio::test]
    async fn camera_source_and_video_type_are_forwarded() {
        let media = media_fixture(Arc::new(GrantAllPermissions));
        media.host.script_pick(Ok(PickOutcome::Cancelled));

        let _ = invoke(
            &media.pipe,
            "media.chooseMedia",
            json!({"sourceType": "camera", "mediaType": "video", "count": 3}),
        )
        .await;

        let requests = media.host.pick_requests.lock().expect("lock");
        assert_eq!(requests[0].source, PickSource::Camera);
        assert_eq!(requests[0].media, PickMediaType::Video);
        assert_eq!(requests[0].count, 3);
    }

    #[tokio::test]
    async fn cancellation_is_reported_as_cancelled() {
        let media = media_fixture(Arc::new(GrantAllPermissions));
        media.host.script_pick(Ok(PickOutcome::Cancelled));

        let (status, data) = invoke(&media.pipe, "media.chooseMedia", json!({})).await;

        assert_eq!(status.code(), 7);
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn denial_never_presents_the_picker() {
        let media = media_fixture(Arc::new(DenyAllPermissions));

        let (status, _) = invoke(&media.pipe, "media.chooseMedia", json!({})).await;

        assert_eq!(status.code(), 4);
        assert!(media.host.pick_requests.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn unknown_source_type_is_invalid() {
        let media = media_fixture(Arc::new(GrantAllPermissions));

        let (status, _) = invoke(
            &media.pipe,
            "media.chooseMedia",
            json!({"sourceType": "scanner"}),
        )
        .await;

        assert_eq!(status.code(), 2);
        assert!(status.message().contains("scanner"));
    }

    #[tokio::test]
    async fn zero_count_is_invalid() {
        let media = media_fixture(Arc::new(GrantAllPermissions));

        let (status, _) = invoke(&media.pipe, "media.chooseMedia", json!({"count": 0})).await;

        assert_eq!(status.code(), 2);
    }

    #[tokio::test]
    async fn picker_errors_fail_the_call() {
        let media = media_fixture(Arc::new(GrantAllPermissions));
        media
            .host
            .script_pick(Err(sparkling_core::SparklingError::PlatformUnavailable));

        let (status, _) = invoke(&media.pipe, "media.chooseMedia", json!({})).await;

        assert_eq!(status.code(), 1);
        assert!(status.message().contains("not available"));
    }
}
