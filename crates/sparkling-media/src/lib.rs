// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sparkling — The media.* method family.
//
// Four methods that exercise every hard edge of the bridge protocol:
// streamed downloads with deterministic cache names, multipart uploads,
// data-URL saves, and the permission-gated system picker.

pub mod choose;
pub mod dataurl;
pub mod download;
pub mod env;
pub mod net;
pub mod upload;

#[cfg(test)]
mod test_support;

pub use env::{MediaEnv, register_media_methods};
pub use net::{
    ByteStream, HttpRequest, HttpResponse, NetworkClient, ReqwestClient, UploadRequest,
    UploadResponse,
};
