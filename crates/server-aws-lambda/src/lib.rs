// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use async_graphql::Executor;
use common::http::{InvocationContext, InvocationEvent};
use graphql_adapter::GraphQLHandler;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;

/// Resolve one Lambda invocation against the shared handler, emitting the
/// platform-shaped JSON value. Protocol failures come back as client
/// responses; anything else is returned as the invocation's error so the
/// platform reports the fault.
pub async fn resolve<E, C>(
    event: LambdaEvent<Value>,
    handler: Arc<GraphQLHandler<E, C>>,
) -> Result<Value, Error>
where
    E: Executor,
    C: Clone + Send + Sync + 'static,
{
    let invocation = invocation_context(&event.context);
    let invocation_event: InvocationEvent = serde_json::from_value(event.payload)?;

    match handler.handle(&invocation_event, &invocation).await {
        Ok(envelope) => Ok(serde_json::to_value(&envelope)?),
        Err(err) => Err(err.into()),
    }
}

/// Drive the Lambda runtime with the given handler until shutdown.
pub async fn run<E, C>(handler: Arc<GraphQLHandler<E, C>>) -> Result<(), Error>
where
    E: Executor,
    C: Clone + Send + Sync + 'static,
{
    common::logging_tracing::init();

    let service = lambda_runtime::service_fn(move |event: LambdaEvent<Value>| {
        let handler = handler.clone();
        async move { resolve(event, handler).await }
    });

    lambda_runtime::run(service).await
}

fn invocation_context(context: &lambda_runtime::Context) -> InvocationContext {
    InvocationContext {
        request_id: context.request_id.clone(),
        invoked_function_arn: context.invoked_function_arn.clone(),
        deadline_ms: context.deadline,
    }
}
