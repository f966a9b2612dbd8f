// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use common::http::{InvocationEvent, ResponseEnvelope};
use http::StatusCode;
use serde_json::Value;

use crate::config::{DEDUPLICATE_HEADER, HandlerOptions};
use crate::dedup;
use crate::error::HandlerError;
use crate::execute::EngineResponse;

/// Map an execution outcome into the platform envelope. Successes are 200
/// with the engine's headers; protocol failures carry their own status,
/// message, and headers; anything else stays a fault for the platform.
pub fn shape(
    outcome: Result<EngineResponse, HandlerError>,
    event: &InvocationEvent,
    options: &HandlerOptions,
) -> Result<ResponseEnvelope, HandlerError> {
    match outcome {
        Ok(EngineResponse { body, headers }) => {
            let body = apply_deduplication(body, event, options);
            let body = match &options.format_response {
                Some(format_response) => format_response(body),
                None => body,
            };
            let body =
                serde_json::to_string(&body).map_err(|err| HandlerError::Unhandled(err.into()))?;

            Ok(ResponseEnvelope::new(StatusCode::OK, headers, body))
        }
        Err(HandlerError::Protocol(protocol)) => Ok(ResponseEnvelope::new(
            protocol.status_code,
            protocol.headers,
            protocol.message,
        )),
        Err(fault) => Err(fault),
    }
}

/// Deduplication runs only when all gates hold: the feature is enabled, the
/// request opted in via header, the response has an object `data` payload,
/// and that payload is not an introspection result.
fn apply_deduplication(
    mut body: Value,
    event: &InvocationEvent,
    options: &HandlerOptions,
) -> Value {
    if !options.deduplicate || event.headers.get(DEDUPLICATE_HEADER).is_none() {
        return body;
    }

    let Some(fields) = body.as_object_mut() else {
        return body;
    };
    let deduplicable = matches!(
        fields.get("data"),
        Some(Value::Object(data)) if !data.contains_key("__schema")
    );
    if deduplicable {
        if let Some(data) = fields.get_mut("data") {
            let payload = std::mem::take(data);
            *data = dedup::deflate(payload);
        }
    }

    body
}
