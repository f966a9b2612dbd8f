// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Bridge from a decoded multipart body to a GraphQL request with attached
//! uploads, per the GraphQL multipart request convention: an `operations`
//! part holding the request JSON (file variables as null placeholders), a
//! `map` part associating file part names with variable paths, then one part
//! per file.

use std::collections::HashMap;
use std::io::{Seek, SeekFrom, Write};

use async_graphql::{Request, UploadValue};
use bytes::Bytes;
use multer::Multipart;
use thiserror::Error;

use crate::config::UploadLimits;

/// Failures while converting a multipart body into a GraphQL request. These
/// surface as invocation faults, not client responses.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] multer::Error),

    #[error("Missing operations part")]
    MissingOperations,

    #[error("Missing map part")]
    MissingMap,

    #[error("Invalid {part} JSON: {source}")]
    InvalidJson {
        part: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Part {0} exceeds the maximum field size of {1} bytes")]
    FieldTooLarge(String, usize),

    #[error("File {0} exceeds the maximum file size of {1} bytes")]
    FileTooLarge(String, usize),

    #[error("More than {0} files in upload")]
    TooManyFiles(usize),

    #[error("File part {0} is not referenced by the map part")]
    UnmappedFile(String),

    #[error("Failed to spool upload to disk: {0}")]
    Io(#[from] std::io::Error),
}

/// Decode `body` (already base64-decoded by the caller) and attach each file
/// at every variable path the map assigns to it.
pub async fn process(
    content_type: &str,
    body: Bytes,
    limits: &UploadLimits,
) -> Result<Request, UploadError> {
    let boundary = multer::parse_boundary(content_type)?;
    let stream = futures::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = Multipart::new(stream, boundary);

    let mut request: Option<Request> = None;
    let mut map: Option<HashMap<String, Vec<String>>> = None;
    let mut uploads: Vec<(String, UploadValue)> = vec![];
    let mut file_count = 0;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "operations" => {
                let data = field.bytes().await?;
                if data.len() > limits.max_field_size {
                    return Err(UploadError::FieldTooLarge(name, limits.max_field_size));
                }
                request = Some(serde_json::from_slice(&data).map_err(|source| {
                    UploadError::InvalidJson {
                        part: "operations",
                        source,
                    }
                })?);
            }
            "map" => {
                let data = field.bytes().await?;
                if data.len() > limits.max_field_size {
                    return Err(UploadError::FieldTooLarge(name, limits.max_field_size));
                }
                map = Some(
                    serde_json::from_slice(&data).map_err(|source| UploadError::InvalidJson {
                        part: "map",
                        source,
                    })?,
                );
            }
            _ => {
                file_count += 1;
                if file_count > limits.max_files {
                    return Err(UploadError::TooManyFiles(limits.max_files));
                }

                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| name.clone());
                let content_type = field.content_type().map(|mime| mime.to_string());

                let data = field.bytes().await?;
                if data.len() > limits.max_file_size {
                    return Err(UploadError::FileTooLarge(filename, limits.max_file_size));
                }

                let mut content = tempfile::tempfile()?;
                content.write_all(&data)?;
                content.seek(SeekFrom::Start(0))?;

                uploads.push((
                    name,
                    UploadValue {
                        filename,
                        content_type,
                        content,
                    },
                ));
            }
        }
    }

    let mut request = request.ok_or(UploadError::MissingOperations)?;
    let mut map = map.ok_or(UploadError::MissingMap)?;

    for (name, upload) in uploads {
        let paths = map
            .remove(&name)
            .ok_or_else(|| UploadError::UnmappedFile(name.clone()))?;
        for path in paths {
            request.set_upload(&path, upload.try_clone()?);
        }
    }

    Ok(request)
}
