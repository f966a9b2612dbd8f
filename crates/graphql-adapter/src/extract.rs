// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql::{Request, Variables};
use base64::Engine;
use common::http::InvocationEvent;

use crate::config::UploadLimits;
use crate::error::{HandlerError, RequestError};
use crate::upload;

const CONTENT_TYPE: &str = "content-type";

/// Decode the invocation into a GraphQL request, branching on how the query
/// was transmitted: JSON body, multipart upload body, or query string.
pub async fn extract(
    event: &InvocationEvent,
    limits: &UploadLimits,
) -> Result<Request, HandlerError> {
    match &event.body {
        Some(body) => {
            // A body without a content type cannot be interpreted; fail
            // instead of dereferencing an absent header.
            let content_type = event
                .headers
                .get(CONTENT_TYPE)
                .ok_or(RequestError::MissingContentType)?;

            if content_type.starts_with("application/json") {
                Ok(serde_json::from_str(body).map_err(RequestError::InvalidBodyJson)?)
            } else if content_type.starts_with("multipart/form-data") {
                let bytes = decode_body(body, event.is_base64_encoded)?;
                // Upload failures (framing, limits) are invocation faults,
                // not client responses.
                upload::process(&content_type, bytes.into(), limits)
                    .await
                    .map_err(|err| HandlerError::Unhandled(err.into()))
            } else {
                Err(RequestError::UnsupportedContentType(content_type).into())
            }
        }
        None => from_query_string(event),
    }
}

fn decode_body(body: &str, is_base64_encoded: bool) -> Result<Vec<u8>, RequestError> {
    if is_base64_encoded {
        base64::engine::general_purpose::STANDARD
            .decode(body)
            .map_err(RequestError::InvalidBodyEncoding)
    } else {
        Ok(body.as_bytes().to_vec())
    }
}

/// GET-style invocation: the query-string parameter mapping is the request
/// source. `variables`, when present, arrives JSON-encoded.
fn from_query_string(event: &InvocationEvent) -> Result<Request, HandlerError> {
    let params = event.query_string_parameters.as_ref();

    let query = params
        .and_then(|p| p.get("query"))
        .cloned()
        .unwrap_or_default();
    let mut request = Request::new(query);

    if let Some(operation_name) = params.and_then(|p| p.get("operationName")) {
        request.operation_name = Some(operation_name.clone());
    }

    if let Some(variables) = params.and_then(|p| p.get("variables")) {
        let value = serde_json::from_str(variables).map_err(RequestError::InvalidVariablesJson)?;
        request.variables = Variables::from_json(value);
    }

    Ok(request)
}
