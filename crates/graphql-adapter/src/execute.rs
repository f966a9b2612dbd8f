// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql::{Executor, Request, Response};
use common::http::{Headers, InvocationEvent};
use http::Method;
use serde_json::Value;

use crate::config::HandlerOptions;
use crate::error::{HandlerError, RequestError};

/// Engine output ready for shaping: the response serialized to a JSON value
/// plus the engine's computed response headers.
#[derive(Debug)]
pub struct EngineResponse {
    pub body: Value,
    pub headers: Headers,
}

/// Invoke the execution engine with the extracted request. GraphQL-level
/// errors (validation, resolver failures) never fail here: the engine embeds
/// them in the response body per GraphQL convention. The failure side is
/// reserved for protocol errors and re-raised faults.
pub async fn execute<E: Executor>(
    executor: &E,
    request: Request,
    event: &InvocationEvent,
    options: &HandlerOptions,
) -> Result<EngineResponse, HandlerError> {
    check_method(&event.http_method)?;

    let mut response = executor.execute(request).await;

    if options.debug && !response.errors.is_empty() {
        tracing::debug!("Execution returned errors: {:?}", response.errors);
    }

    if let Some(format_error) = &options.format_error {
        let errors = std::mem::take(&mut response.errors);
        response.errors = errors.into_iter().map(|err| format_error(err)).collect();
    }

    let headers = response_headers(&response);
    let body = serde_json::to_value(&response).map_err(|err| HandlerError::Unhandled(err.into()))?;

    Ok(EngineResponse { body, headers })
}

/// Only GET and POST reach the engine; anything else is a protocol error.
fn check_method(method: &str) -> Result<(), RequestError> {
    match Method::from_bytes(method.as_bytes()) {
        Ok(method) if method == Method::GET || method == Method::POST => Ok(()),
        _ => Err(RequestError::MethodNotAllowed(method.to_string())),
    }
}

fn response_headers(response: &Response) -> Headers {
    let mut headers = Headers::from_vec(
        response
            .http_headers
            .iter()
            .filter_map(|(key, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (key.as_str().to_string(), value.to_string()))
            })
            .collect(),
    );
    headers.insert("content-type".into(), "application/json".into());
    headers
}
