// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::io::Read;
use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, Object, Schema, SimpleObject, Upload};
use graphql_adapter::GraphQLHandler;
use serde_json::Value;
use server_aws_lambda::resolve;

#[derive(SimpleObject)]
pub struct DummyUser {
    id: i32,
    name: String,
}

fn bran() -> DummyUser {
    DummyUser {
        id: 1,
        name: "Bran".to_string(),
    }
}

pub struct Query;

#[Object]
impl Query {
    async fn dummy_user(&self) -> DummyUser {
        bran()
    }

    /// Two identical nodes, so deduplication has something to collapse.
    async fn friends(&self) -> Vec<DummyUser> {
        vec![bran(), bran()]
    }
}

pub struct Mutation;

#[Object]
impl Mutation {
    async fn read_file(&self, ctx: &Context<'_>, file: Upload) -> async_graphql::Result<String> {
        let upload = file.value(ctx)?;
        let mut content = String::new();
        upload.content.take(1 << 20).read_to_string(&mut content)?;
        Ok(content)
    }
}

pub type TestSchema = Schema<Query, Mutation, EmptySubscription>;

pub fn schema() -> TestSchema {
    Schema::new(Query, Mutation, EmptySubscription)
}

pub fn handler() -> Arc<GraphQLHandler<TestSchema>> {
    Arc::new(GraphQLHandler::new(schema()))
}

pub async fn run_handler(
    handler: Arc<GraphQLHandler<TestSchema>>,
    json_input: Value,
) -> Result<Value, lambda_runtime::Error> {
    let context = lambda_runtime::Context::default();
    let event = lambda_runtime::LambdaEvent::new(json_input, context);

    resolve(event, handler).await
}

pub async fn test_query(json_input: Value, expected: Value) {
    let result = run_handler(handler(), json_input).await.unwrap();

    assert_eq!(expected, result);
}
