// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for media method tests: a scripted network client, a
// recording platform host, and a pipe wired to a temp cache directory.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use sparkling_bridge::platform::PickCallback;
use sparkling_bridge::{
    MediaLibrary, MediaPicker, MethodPipe, MethodRegistry, PermissionGate, PermissionProvider,
    PickOutcome, PickRequest, PlatformHost,
};
use sparkling_core::error::Result;
use sparkling_core::{ContainerConfig, MethodStatus};

use crate::env::{MediaEnv, register_media_methods};
use crate::net::{ByteStream, HttpRequest, HttpResponse, NetworkClient, UploadRequest, UploadResponse};

// ---------------------------------------------------------------------------
// Scripted network client
// ---------------------------------------------------------------------------

/// One scripted HTTP response: a status and an ordered list of chunk
/// outcomes. `Err` entries simulate mid-stream transport failures.
pub(crate) struct FakeHttp {
    status: u16,
    chunks: Vec<Result<Bytes>>,
}

impl FakeHttp {
    /// 200 response delivering the given chunks.
    pub fn ok(chunks: &[&[u8]]) -> Self {
        Self::status(200, chunks)
    }

    pub fn status(status: u16, chunks: &[&[u8]]) -> Self {
        Self {
            status,
            chunks: chunks
                .iter()
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect(),
        }
    }

    /// Delivers the given chunks, then errors out mid-stream.
    pub fn broken(chunks: &[&[u8]], error: &str) -> Self {
        let mut all: Vec<Result<Bytes>> = chunks
            .iter()
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        all.push(Err(sparkling_core::SparklingError::Http(error.into())));
        Self { status: 200, chunks: all }
    }
}

struct FakeBody {
    chunks: VecDeque<Result<Bytes>>,
}

#[async_trait]
impl ByteStream for FakeBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        match self.chunks.pop_front() {
            Some(Ok(bytes)) => Ok(Some(bytes)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

/// Network client that replays scripted responses and records every request.
pub(crate) struct FakeClient {
    pub fetch_count: AtomicUsize,
    fetch_script: Mutex<VecDeque<Result<FakeHttp>>>,
    pub uploads: Mutex<Vec<UploadRequest>>,
    upload_script: Mutex<VecDeque<Result<UploadResponse>>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            fetch_count: AtomicUsize::new(0),
            fetch_script: Mutex::new(VecDeque::new()),
            uploads: Mutex::new(Vec::new()),
            upload_script: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_fetch(&self, response: Result<FakeHttp>) {
        self.fetch_script
            .lock()
            .expect("lock")
            .push_back(response);
    }

    pub fn push_upload(&self, response: Result<UploadResponse>) {
        self.upload_script
            .lock()
            .expect("lock")
            .push_back(response);
    }
}

#[async_trait]
impl NetworkClient for FakeClient {
    async fn fetch(&self, _request: HttpRequest) -> Result<HttpResponse> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .fetch_script
            .lock()
            .expect("lock")
            .pop_front()
            .expect("unscripted fetch");
        let fake = scripted?;
        Ok(HttpResponse {
            status: fake.status,
            content_length: None,
            body: Box::new(FakeBody {
                chunks: fake.chunks.into(),
            }),
        })
    }

    async fn post_file(&self, request: UploadRequest) -> Result<UploadResponse> {
        self.uploads.lock().expect("lock").push(request);
        self.upload_script
            .lock()
            .expect("lock")
            .pop_front()
            .expect("unscripted upload")
    }
}

// ---------------------------------------------------------------------------
// Recording platform host
// ---------------------------------------------------------------------------

/// Platform host that records picker requests and album saves, answering
/// pickers from a script.
pub(crate) struct RecordingHost {
    pub pick_requests: Mutex<Vec<PickRequest>>,
    pick_script: Mutex<VecDeque<Result<PickOutcome>>>,
    pub album_saves: Mutex<Vec<PathBuf>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            pick_requests: Mutex::new(Vec::new()),
            pick_script: Mutex::new(VecDeque::new()),
            album_saves: Mutex::new(Vec::new()),
        }
    }

    pub fn script_pick(&self, outcome: Result<PickOutcome>) {
        self.pick_script.lock().expect("lock").push_back(outcome);
    }
}

impl PlatformHost for RecordingHost {
    fn platform_name(&self) -> &str {
        "Test"
    }
}

impl MediaPicker for RecordingHost {
    fn pick_media(&self, request: PickRequest, done: PickCallback) {
        self.pick_requests.lock().expect("lock").push(request);
        let outcome = self
            .pick_script
            .lock()
            .expect("lock")
            .pop_front()
            .expect("unscripted pick");
        done(outcome);
    }
}

impl MediaLibrary for RecordingHost {
    fn save_to_album(&self, path: &Path) -> Result<()> {
        self.album_saves.lock().expect("lock").push(path.to_owned());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixture assembly
// ---------------------------------------------------------------------------

/// Everything a media method test needs. The temp dir must outlive the
/// fixture, so it rides along.
pub(crate) struct TestMedia {
    pub dir: tempfile::TempDir,
    pub env: Arc<MediaEnv>,
    pub client: Arc<FakeClient>,
    pub host: Arc<RecordingHost>,
    pub pipe: MethodPipe,
}

pub(crate) fn media_fixture(provider: Arc<dyn PermissionProvider>) -> TestMedia {
    media_fixture_with(provider, ContainerConfig::default())
}

pub(crate) fn media_fixture_with(
    provider: Arc<dyn PermissionProvider>,
    config: ContainerConfig,
) -> TestMedia {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = Arc::new(FakeClient::new());
    let host = Arc::new(RecordingHost::new());
    let gate = Arc::new(PermissionGate::new(provider));
    let env = MediaEnv::new(
        dir.path().join("cache"),
        config,
        client.clone(),
        gate,
        host.clone(),
    )
    .expect("media env");

    let registry = Arc::new(MethodRegistry::new());
    register_media_methods(&registry, env.clone());
    let pipe = MethodPipe::new("test", registry);

    TestMedia {
        dir,
        env,
        client,
        host,
        pipe,
    }
}

/// Invoke through the pipe and await the single completion.
pub(crate) async fn invoke(
    pipe: &MethodPipe,
    name: &str,
    params: Value,
) -> (MethodStatus, Option<Value>) {
    let (tx, rx) = tokio::sync::oneshot::channel();
    pipe.invoke(name, params, move |status, data| {
        let _ = tx.send((status, data));
    });
    rx.await.expect("completion never fired")
}
