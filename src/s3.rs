//! Anonymous access to a public S3 bucket.
//!
//! Listing goes through the AWS SDK without credentials, objects are fetched
//! over plain HTTPS from the bucket's public URL.

use anyhow::Result;
use aws_config::{Region, SdkConfig};
use aws_sdk_s3::{error::DisplayErrorContext, types::Object};
use reqwest::Client;

use crate::error::GlmError;

/// Region of the NOAA open data buckets.
const REGION: &str = "us-east-1";

#[derive(Debug, Clone, PartialEq)]
pub struct S3Object {
    pub key: String,
    pub size: u64,
}

impl S3Object {
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }

    fn from_listed(object: &Object) -> Option<Self> {
        Some(S3Object {
            key: object.key()?.to_string(),
            size: object.size().unwrap_or(0).max(0) as u64,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BucketClient {
    s3: aws_sdk_s3::Client,
    http: Client,
    bucket: String,
    base_url: String,
}

impl BucketClient {
    /// Client for `bucket` on AWS, objects served from `https://<bucket>.s3.amazonaws.com`.
    pub async fn new(bucket: &str) -> Self {
        let config = load_config(None).await;

        BucketClient {
            s3: aws_sdk_s3::Client::new(&config),
            http: Client::new(),
            bucket: bucket.to_string(),
            base_url: format!("https://{}.s3.amazonaws.com", bucket),
        }
    }

    /// Client for `bucket` served path-style from `endpoint`, e.g. a local S3 stand-in.
    pub async fn with_endpoint(http: Client, bucket: &str, endpoint: &str) -> Self {
        let endpoint = endpoint.trim_end_matches('/');
        let config = load_config(Some(endpoint)).await;
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();

        BucketClient {
            s3: aws_sdk_s3::Client::from_conf(s3_config),
            http,
            bucket: bucket.to_string(),
            base_url: format!("{}/{}", endpoint, bucket),
        }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    /// Lists all objects under `prefix`, across result pages, sorted by key.
    pub async fn list_objects(&self, prefix: &str) -> Result<Vec<S3Object>> {
        let mut pages = self
            .s3
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| GlmError::Listing {
                prefix: prefix.to_string(),
                status: e.raw_response().map(|r| r.status().as_u16()),
                reason: DisplayErrorContext(&e).to_string(),
            })?;
            objects.extend(page.contents().iter().filter_map(S3Object::from_listed));
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));

        Ok(objects)
    }
}

async fn load_config(endpoint: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::from_env()
        .no_credentials()
        .region(Region::new(REGION));
    if let Some(url) = endpoint {
        loader = loader.endpoint_url(url);
    }

    loader.load().await
}

// -- Tests -------------------------------------------------------------------
