// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use common::http::{InvocationContext, InvocationEvent};
use futures::future::BoxFuture;

/// Arguments handed to a dynamic context callback.
pub struct ContextParams<'a> {
    pub event: &'a InvocationEvent,
    pub invocation: &'a InvocationContext,
}

type ContextFn<C> =
    dyn for<'a> Fn(ContextParams<'a>) -> BoxFuture<'a, Result<C, anyhow::Error>> + Send + Sync;

/// Where the per-request context value comes from: a fixed value cloned per
/// invocation, or a callback computed (and awaited) per invocation.
pub enum ContextSource<C> {
    Static(C),
    Dynamic(Box<ContextFn<C>>),
}

impl<C> ContextSource<C> {
    /// Wrap a callback without spelling out the boxed-future type.
    pub fn from_callback<F>(callback: F) -> Self
    where
        F: for<'a> Fn(ContextParams<'a>) -> BoxFuture<'a, Result<C, anyhow::Error>>
            + Send
            + Sync
            + 'static,
    {
        ContextSource::Dynamic(Box::new(callback))
    }
}

impl<C: Clone + Send + Sync + 'static> ContextSource<C> {
    /// Resolve the context for one invocation. A callback failure is logged
    /// and re-raised: it is fatal to the invocation, never swallowed.
    pub async fn resolve(
        &self,
        event: &InvocationEvent,
        invocation: &InvocationContext,
    ) -> Result<C, anyhow::Error> {
        match self {
            ContextSource::Static(value) => Ok(value.clone()),
            ContextSource::Dynamic(callback) => callback(ContextParams { event, invocation })
                .await
                .inspect_err(|err| {
                    tracing::error!("Context resolution failed: {err:?}");
                }),
        }
    }
}

impl Default for ContextSource<()> {
    fn default() -> Self {
        ContextSource::Static(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::http::Headers;

    #[tokio::test]
    async fn static_context_is_returned_unchanged() {
        let source = ContextSource::Static("fixed".to_string());

        let value = source
            .resolve(&InvocationEvent::default(), &InvocationContext::default())
            .await
            .unwrap();

        assert_eq!(value, "fixed");
    }

    #[tokio::test]
    async fn dynamic_context_sees_the_event_and_invocation() {
        let source = ContextSource::from_callback(|params: ContextParams<'_>| {
            Box::pin(async move {
                let user = params.event.headers.get("x-user").unwrap_or_default();
                Ok(format!("{user}:{}", params.invocation.request_id))
            })
        });

        let event = InvocationEvent {
            headers: Headers::from_vec(vec![("X-User".into(), "bran".into())]),
            ..Default::default()
        };
        let invocation = InvocationContext {
            request_id: "req-1".into(),
            ..Default::default()
        };

        let value = source.resolve(&event, &invocation).await.unwrap();

        assert_eq!(value, "bran:req-1");
    }

    #[tokio::test]
    async fn dynamic_context_failure_is_reraised() {
        let source: ContextSource<String> = ContextSource::from_callback(|_| {
            Box::pin(async { Err::<String, _>(anyhow::anyhow!("token lookup failed")) })
        });

        let result = source
            .resolve(&InvocationEvent::default(), &InvocationContext::default())
            .await;

        assert!(result.is_err());
    }
}
