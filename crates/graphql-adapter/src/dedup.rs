// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Duplicate-node compression over a response's `data` payload. Nodes are
//! identified by their `(__typename, id)` pair: the first occurrence keeps
//! its full shape, later occurrences collapse to a `{__typename, id}`
//! back-reference stub. `inflate` is the receiving side's inverse.
//!
//! Both transforms are pure; callers gate when they run.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

/// Replace repeated identified nodes with back-reference stubs.
pub fn deflate(data: Value) -> Value {
    let mut seen = HashSet::new();
    deflate_node(data, &mut seen)
}

/// Re-expand back-reference stubs from the first full occurrence of each
/// identified node. Inverse of [`deflate`].
pub fn inflate(data: Value) -> Value {
    let mut index = HashMap::new();
    inflate_node(data, &mut index)
}

fn deflate_node(node: Value, seen: &mut HashSet<(String, String)>) -> Value {
    match node {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| deflate_node(item, seen))
                .collect(),
        ),
        Value::Object(fields) => {
            if let Some(key) = node_key(&fields) {
                if seen.contains(&key) {
                    return stub(&fields, key.0);
                }
                seen.insert(key);
            }
            Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, deflate_node(value, seen)))
                    .collect(),
            )
        }
        scalar => scalar,
    }
}

fn inflate_node(node: Value, index: &mut HashMap<(String, String), Value>) -> Value {
    match node {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| inflate_node(item, index))
                .collect(),
        ),
        Value::Object(fields) => {
            match node_key(&fields) {
                // A two-field identified node is a stub; restore the full
                // node when its first occurrence has been recorded.
                Some(key) if fields.len() == 2 => match index.get(&key) {
                    Some(full) => full.clone(),
                    None => Value::Object(fields),
                },
                Some(key) => {
                    let full = Value::Object(
                        fields
                            .into_iter()
                            .map(|(name, value)| (name, inflate_node(value, index)))
                            .collect(),
                    );
                    index.entry(key).or_insert_with(|| full.clone());
                    full
                }
                None => Value::Object(
                    fields
                        .into_iter()
                        .map(|(name, value)| (name, inflate_node(value, index)))
                        .collect(),
                ),
            }
        }
        scalar => scalar,
    }
}

/// A node participates in deduplication only when it carries both
/// `__typename` and a scalar `id`.
fn node_key(fields: &Map<String, Value>) -> Option<(String, String)> {
    let typename = fields.get("__typename")?.as_str()?;
    let id = match fields.get("id")? {
        Value::String(id) => id.clone(),
        Value::Number(id) => id.to_string(),
        _ => return None,
    };
    Some((typename.to_string(), id))
}

fn stub(fields: &Map<String, Value>, typename: String) -> Value {
    let mut stub = Map::new();
    stub.insert("__typename".to_string(), Value::String(typename));
    if let Some(id) = fields.get("id") {
        stub.insert("id".to_string(), id.clone());
    }
    Value::Object(stub)
}
