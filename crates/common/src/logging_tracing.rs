// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! # Tracing configuration setup.
//!
//! The adapter code is instrumented with Rust's `tracing` framework.
//!
//! Calling the `init` function will initialize a global tracing subscriber
//! based on the value of the `GRAPHQL_LAMBDA_LOG` environment variable, which
//! follows the same conventions as `RUST_LOG`. This provides console logging
//! with a WARN default.

use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*};

const GRAPHQL_LAMBDA_LOG: &str = "GRAPHQL_LAMBDA_LOG";

/// Initialize the tracing subscriber. Must be called at most once per
/// process, before the first invocation is served.
pub fn init() {
    let fmt_layer = tracing_subscriber::fmt::layer().compact();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(GRAPHQL_LAMBDA_LOG)
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
