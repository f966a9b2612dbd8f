// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use common::http::Headers;
use http::StatusCode;
use thiserror::Error;

/// Client-caused failures detected while decoding the invocation into a
/// GraphQL request. Each maps deterministically to a 4xx status.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Missing content-type header on a request with a body")]
    MissingContentType,

    #[error("Unsupported content type {0}")]
    UnsupportedContentType(String),

    #[error("Invalid body JSON: {0}")]
    InvalidBodyJson(#[source] serde_json::Error),

    #[error("Invalid variables JSON: {0}")]
    InvalidVariablesJson(#[source] serde_json::Error),

    #[error("Invalid base64 body: {0}")]
    InvalidBodyEncoding(#[source] base64::DecodeError),

    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::UnsupportedContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RequestError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::MissingContentType
            | RequestError::InvalidBodyJson(_)
            | RequestError::InvalidVariablesJson(_)
            | RequestError::InvalidBodyEncoding(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let RequestError::MethodNotAllowed(_) = self {
            headers.insert("allow".into(), "GET, POST".into());
        }
        headers
    }
}

/// A protocol-level failure, carrying everything the platform envelope
/// needs: status code, client-facing message, and response headers.
#[derive(Debug)]
pub struct ProtocolError {
    pub status_code: StatusCode,
    pub message: String,
    pub headers: Headers,
}

impl From<RequestError> for ProtocolError {
    fn from(err: RequestError) -> Self {
        ProtocolError {
            status_code: err.status_code(),
            message: err.to_string(),
            headers: err.headers(),
        }
    }
}

/// The failure side of an execution outcome. `Protocol` errors are mapped to
/// client responses by the response shaper; `Unhandled` causes are re-raised
/// so the platform's own fault path reports them.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("{}", .0.message)]
    Protocol(ProtocolError),

    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

impl From<RequestError> for HandlerError {
    fn from(err: RequestError) -> Self {
        HandlerError::Protocol(err.into())
    }
}
