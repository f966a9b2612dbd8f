// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
use common::http::{Headers, InvocationEvent, ResponseEnvelope, strip_leading_slash};
use http::{Method, StatusCode};

/// Serves the interactive schema-exploration page. This is a separate entry
/// point from query execution: it only answers GET requests on its own path
/// and never touches execution state.
pub struct PlaygroundRouter {
    playground_path: String,
    endpoint: String,
}

impl PlaygroundRouter {
    /// `playground_path` is where the page is served; `endpoint` is the
    /// GraphQL endpoint the page sends its queries to.
    pub fn new(playground_path: String, endpoint: String) -> Self {
        Self {
            playground_path: strip_leading_slash(&playground_path),
            endpoint,
        }
    }

    fn suitable(&self, event: &InvocationEvent) -> bool {
        strip_leading_slash(&event.path) == self.playground_path
            && event.http_method == Method::GET.as_str()
    }

    /// Answer a playground request, or `None` when the event is not one, so
    /// callers can fall through to query execution.
    pub fn route(&self, event: &InvocationEvent) -> Option<ResponseEnvelope> {
        if !self.suitable(event) {
            return None;
        }

        let html = playground_source(GraphQLPlaygroundConfig::new(&self.endpoint));

        let mut headers = Headers::new();
        headers.insert("content-type".into(), "text/html".into());

        Some(ResponseEnvelope::new(StatusCode::OK, headers, html))
    }
}
