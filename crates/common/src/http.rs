// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;

use http::StatusCode;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Header mapping with case-insensitive keys. Platforms deliver headers with
/// arbitrary casing (`content-type`, `Content-Type`), so keys are lowercased
/// on construction and on lookup.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    inner: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self { inner: vec![] }
    }

    pub fn from_vec(vec: Vec<(String, String)>) -> Self {
        let mut headers = vec![];
        for (key, value) in vec {
            headers.push((key.to_lowercase(), value));
        }
        Self { inner: headers }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner
            .iter()
            .find(|(k, _)| k == &key.to_lowercase())
            .map(|(_, v)| v.clone())
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.inner.push((key.to_lowercase(), value));
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Platforms emit `"headers": null` for header-less test events.
        let map = Option::<HashMap<String, String>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Headers::from_vec(map.into_iter().collect()))
    }
}

impl Serialize for Headers {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.inner.len()))?;
        for (key, value) in &self.inner {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// The inbound request descriptor, as delivered by the function platform
/// (API Gateway proxy shape). Immutable for the duration of one invocation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvocationEvent {
    pub http_method: String,
    pub path: String,
    pub headers: Headers,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
    pub query_string_parameters: Option<HashMap<String, String>>,
}

/// Platform-supplied metadata about the current invocation. Opaque to the
/// adapter core; handed through to context resolution only.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub request_id: String,
    pub invoked_function_arn: String,
    pub deadline_ms: u64,
}

/// The platform-shaped output of one invocation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: Headers,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ResponseEnvelope {
    pub fn new(status_code: StatusCode, headers: Headers, body: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            headers,
            body,
            is_base64_encoded: false,
        }
    }
}

pub fn strip_leading_slash(path: &str) -> String {
    strip_leading(path, "/")
}

pub fn strip_leading(path: &str, leading: &str) -> String {
    path.strip_prefix(leading).unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_lookup_ignores_case() {
        let headers = Headers::from_vec(vec![("Content-Type".into(), "application/json".into())]);

        assert_eq!(headers.get("content-type").as_deref(), Some("application/json"));
        assert_eq!(headers.get("Content-Type").as_deref(), Some("application/json"));
        assert_eq!(headers.get("accept"), None);
    }

    #[test]
    fn event_deserializes_from_platform_payload() {
        let event: InvocationEvent = serde_json::from_value(json!({
            "httpMethod": "POST",
            "path": "/graphql",
            "headers": {"Content-Type": "application/json"},
            "body": "{\"query\":\"{ __typename }\"}",
            "isBase64Encoded": false,
            "queryStringParameters": null
        }))
        .unwrap();

        assert_eq!(event.http_method, "POST");
        assert_eq!(event.headers.get("content-type").as_deref(), Some("application/json"));
        assert!(!event.is_base64_encoded);
        assert!(event.query_string_parameters.is_none());
    }

    #[test]
    fn event_tolerates_missing_fields() {
        let event: InvocationEvent = serde_json::from_value(json!({
            "httpMethod": "GET",
            "path": "/graphql"
        }))
        .unwrap();

        assert!(event.body.is_none());
        assert!(event.headers.is_empty());
    }

    #[test]
    fn event_tolerates_null_headers() {
        let event: InvocationEvent = serde_json::from_value(json!({
            "httpMethod": "GET",
            "path": "/graphql",
            "headers": null
        }))
        .unwrap();

        assert!(event.headers.is_empty());
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let envelope = ResponseEnvelope::new(
            StatusCode::OK,
            Headers::from_vec(vec![("content-type".into(), "application/json".into())]),
            "{}".to_string(),
        );

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "statusCode": 200,
                "headers": {"content-type": "application/json"},
                "body": "{}",
                "isBase64Encoded": false
            })
        );
    }
}
