//! Downloads bucket objects to disk.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;

use crate::{
    error::GlmError,
    s3::{BucketClient, S3Object},
};

/// Streams the body at `url` into `file_path` and returns the number of bytes written.
///
/// The body is written to a `.part` sibling first so an interrupted download
/// never leaves a truncated file under the final name.
pub async fn download_object(client: &Client, url: &str, file_path: &Path) -> Result<u64> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        return Err(GlmError::Download {
            url: url.to_string(),
            status: response.status(),
        }
        .into());
    }

    let part_path = file_path.with_extension("part");
    let mut file = File::create(&part_path)?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.with_context(|| format!("Error reading {}", url))?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
    }
    file.flush()?;
    drop(file);

    fs::rename(&part_path, file_path)?;

    Ok(downloaded)
}

/// Where a fetched object came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetched {
    Cached,
    Downloaded(u64),
}

/// Returns a local copy of `object` in `dir`, downloading it unless a file
/// of the same size is already there.
pub async fn fetch_object(
    bucket: &BucketClient,
    object: &S3Object,
    dir: &Path,
) -> Result<(PathBuf, Fetched)> {
    let file_path = dir.join(object.file_name());

    if let Ok(metadata) = fs::metadata(&file_path) {
        if metadata.is_file() && metadata.len() == object.size {
            return Ok((file_path, Fetched::Cached));
        }
    }

    let url = bucket.object_url(&object.key);
    let bytes = download_object(bucket.http(), &url, &file_path).await?;

    Ok((file_path, Fetched::Downloaded(bytes)))
}

// -- Tests -------------------------------------------------------------------
