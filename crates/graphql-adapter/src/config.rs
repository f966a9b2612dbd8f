// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use async_graphql::ServerError;
use serde_json::Value;

/// Request header that opts a single invocation into response deduplication.
pub const DEDUPLICATE_HEADER: &str = "x-graphql-deduplicate";

/// Reshapes individual GraphQL error objects before serialization.
pub type FormatError = Arc<dyn Fn(ServerError) -> ServerError + Send + Sync>;

/// Reshapes the top-level response value; its return value is the final body.
pub type FormatResponse = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Limits applied while decoding a multipart upload body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_field_size: usize,
    pub max_file_size: usize,
    pub max_files: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_field_size: 1_000_000, // 1MB
            max_file_size: 2_000_000,  // 2MB
            max_files: 4,
        }
    }
}

/// Partial upload limits. Merging is field-by-field: an unset field inherits
/// the value it is merged into, so a caller overriding one limit keeps the
/// defaults for the others.
#[derive(Debug, Clone, Default)]
pub struct UploadLimitsOverrides {
    pub max_field_size: Option<usize>,
    pub max_file_size: Option<usize>,
    pub max_files: Option<usize>,
}

impl UploadLimits {
    pub fn merged(self, overrides: UploadLimitsOverrides) -> Self {
        Self {
            max_field_size: overrides.max_field_size.unwrap_or(self.max_field_size),
            max_file_size: overrides.max_file_size.unwrap_or(self.max_file_size),
            max_files: overrides.max_files.unwrap_or(self.max_files),
        }
    }
}

/// Handler configuration, constructed once and shared read-only across
/// invocations.
#[derive(Clone)]
pub struct HandlerOptions {
    /// Path the GraphQL endpoint is served under; consumed by the playground
    /// entry point, not by query execution.
    pub endpoint: String,
    pub deduplicate: bool,
    pub uploads: UploadLimits,
    pub debug: bool,
    pub format_error: Option<FormatError>,
    pub format_response: Option<FormatResponse>,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            endpoint: "/graphql".to_string(),
            deduplicate: true,
            uploads: UploadLimits::default(),
            debug: false,
            format_error: None,
            format_response: None,
        }
    }
}

/// Caller-supplied partial options overlaid on the defaults.
#[derive(Clone, Default)]
pub struct HandlerOptionsOverrides {
    pub endpoint: Option<String>,
    pub deduplicate: Option<bool>,
    pub uploads: UploadLimitsOverrides,
    pub debug: Option<bool>,
    pub format_error: Option<FormatError>,
    pub format_response: Option<FormatResponse>,
}

impl HandlerOptions {
    /// Overlay `overrides` field by field. The `uploads` sub-structure
    /// deep-merges: partial upload limits inherit the remaining defaults
    /// instead of replacing the whole sub-structure.
    pub fn merged(self, overrides: HandlerOptionsOverrides) -> Self {
        Self {
            endpoint: overrides.endpoint.unwrap_or(self.endpoint),
            deduplicate: overrides.deduplicate.unwrap_or(self.deduplicate),
            uploads: self.uploads.merged(overrides.uploads),
            debug: overrides.debug.unwrap_or(self.debug),
            format_error: overrides.format_error.or(self.format_error),
            format_response: overrides.format_response.or(self.format_response),
        }
    }
}
