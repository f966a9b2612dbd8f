// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Adapts a single serverless invocation into one GraphQL execution and
//! back: content-type–based query extraction, per-request context
//! resolution, execution against a precompiled schema, and platform-shaped
//! response mapping with optional duplicate-node elision.
//!
//! Schema building, field resolution, and validation belong to the engine
//! (`async-graphql`); this crate only bridges one invocation event to one
//! execution.

pub mod config;
pub mod context;
pub mod dedup;
pub mod error;
pub mod execute;
pub mod extract;
pub mod shape;
pub mod upload;

use async_graphql::Executor;
use common::http::{InvocationContext, InvocationEvent, ResponseEnvelope};
use tracing::instrument;

pub use config::{
    DEDUPLICATE_HEADER, HandlerOptions, HandlerOptionsOverrides, UploadLimits,
    UploadLimitsOverrides,
};
pub use context::{ContextParams, ContextSource};
pub use error::{HandlerError, ProtocolError, RequestError};
pub use execute::EngineResponse;
pub use upload::UploadError;

/// A configured GraphQL invocation handler: a precompiled executable schema,
/// a context source, and merged options. Constructed once at startup and
/// shared read-only across invocations (typically behind an `Arc`).
pub struct GraphQLHandler<E, C = ()> {
    executor: E,
    context: ContextSource<C>,
    options: HandlerOptions,
}

impl<E: Executor> GraphQLHandler<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            context: ContextSource::default(),
            options: HandlerOptions::default(),
        }
    }
}

impl<E: Executor, C: Clone + Send + Sync + 'static> GraphQLHandler<E, C> {
    /// Replace the context source; the context type may change.
    pub fn with_context<D: Clone + Send + Sync + 'static>(
        self,
        context: ContextSource<D>,
    ) -> GraphQLHandler<E, D> {
        GraphQLHandler {
            executor: self.executor,
            context,
            options: self.options,
        }
    }

    /// Overlay caller options on the defaults (see
    /// [`HandlerOptions::merged`] for the merge semantics).
    pub fn with_options(mut self, overrides: HandlerOptionsOverrides) -> Self {
        self.options = self.options.merged(overrides);
        self
    }

    pub fn options(&self) -> &HandlerOptions {
        &self.options
    }

    /// Process one invocation end to end: extract the query, resolve the
    /// context, execute, and shape the platform envelope. Protocol-level
    /// failures come back as client-facing envelopes; any other failure is
    /// the returned error, to be re-raised to the platform.
    #[instrument(name = "graphql_handler::handle", skip_all, fields(request_id = %invocation.request_id))]
    pub async fn handle(
        &self,
        event: &InvocationEvent,
        invocation: &InvocationContext,
    ) -> Result<ResponseEnvelope, HandlerError> {
        let outcome = self.outcome(event, invocation).await;
        shape::shape(outcome, event, &self.options)
    }

    async fn outcome(
        &self,
        event: &InvocationEvent,
        invocation: &InvocationContext,
    ) -> Result<EngineResponse, HandlerError> {
        let request = extract::extract(event, &self.options.uploads).await?;

        let context = self
            .context
            .resolve(event, invocation)
            .await
            .map_err(HandlerError::Unhandled)?;
        let request = request.data(context);

        execute::execute(&self.executor, request, event, &self.options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema};
    use common::http::Headers;
    use serde_json::json;

    #[derive(Clone)]
    struct CurrentUser(String);

    struct Query;

    #[Object]
    impl Query {
        async fn whoami(&self, ctx: &Context<'_>) -> String {
            ctx.data_unchecked::<CurrentUser>().0.clone()
        }
    }

    fn schema() -> Schema<Query, EmptyMutation, EmptySubscription> {
        Schema::new(Query, EmptyMutation, EmptySubscription)
    }

    fn query_event(query: &str) -> InvocationEvent {
        InvocationEvent {
            http_method: "POST".into(),
            path: "/graphql".into(),
            headers: Headers::from_vec(vec![("content-type".into(), "application/json".into())]),
            body: Some(json!({"query": query}).to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn static_context_reaches_resolvers() {
        let handler = GraphQLHandler::new(schema())
            .with_context(ContextSource::Static(CurrentUser("bran".into())));

        let envelope = handler
            .handle(&query_event("{ whoami }"), &InvocationContext::default())
            .await
            .unwrap();

        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.body, r#"{"data":{"whoami":"bran"}}"#);
    }

    #[tokio::test]
    async fn dynamic_context_is_computed_from_the_event() {
        let handler = GraphQLHandler::new(schema()).with_context(ContextSource::from_callback(
            |params: ContextParams<'_>| {
                Box::pin(async move {
                    Ok(CurrentUser(
                        params.event.headers.get("x-user").unwrap_or_default(),
                    ))
                })
            },
        ));

        let mut event = query_event("{ whoami }");
        event.headers.insert("x-user".into(), "rickon".into());

        let envelope = handler
            .handle(&event, &InvocationContext::default())
            .await
            .unwrap();

        assert_eq!(envelope.body, r#"{"data":{"whoami":"rickon"}}"#);
    }

    #[tokio::test]
    async fn context_failure_is_fatal_to_the_invocation() {
        let handler: GraphQLHandler<_, CurrentUser> = GraphQLHandler::new(schema()).with_context(
            ContextSource::from_callback(|_| {
                Box::pin(async { Err::<CurrentUser, _>(anyhow::anyhow!("no credentials")) })
            }),
        );

        let result = handler
            .handle(&query_event("{ whoami }"), &InvocationContext::default())
            .await;

        assert!(matches!(result, Err(HandlerError::Unhandled(_))));
    }

    #[tokio::test]
    async fn decoding_failures_never_reach_the_engine() {
        let handler = GraphQLHandler::new(schema())
            .with_context(ContextSource::Static(CurrentUser("unused".into())));

        let mut event = query_event("ignored");
        event.body = Some("{broken".into());

        let envelope = handler
            .handle(&event, &InvocationContext::default())
            .await
            .unwrap();

        assert_eq!(envelope.status_code, 400);
    }
}
