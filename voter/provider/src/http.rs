// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: MIT
//! A minimal json over http client shared by the hub and sequencer calls.

use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Returned when the server answers with a status code over 299.
#[derive(Debug, Error)]
#[error("request to {url} failed with status {status}: {body}")]
pub struct RequestFailed {
    pub url: Url,
    pub status: StatusCode,
    pub body: String,
}

#[derive(Clone, Debug)]
pub struct JsonHttpClient {
    http_client: Client,
}

impl JsonHttpClient {
    pub fn new() -> Result<Self> {
        let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http_client })
    }

    /// Posts `body` as json to `url` and decodes the json response into `R`.
    pub async fn post<B, R>(&self, url: &Url, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = self.send(url, body).await?;
        let response_body = response.text().await?;
        log::trace!("response from {url}: {response_body}");

        serde_json::from_str(&response_body)
            .map_err(|e| anyhow!("cannot decode response from {url}: {e}"))
    }

    /// Posts `body` as json to `url`, ignoring the response body on success.
    pub async fn post_discard<B>(&self, url: &Url, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(url, body).await?;
        Ok(())
    }

    async fn send<B>(&self, url: &Url, body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        let request_body = serde_json::to_string(body)?;
        log::trace!("posting to {url}: {request_body}");

        let response = self
            .http_client
            .post(url.as_str())
            .headers(HeaderMap::from_iter([(
                CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )]))
            .body(request_body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 300 {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestFailed {
                url: url.clone(),
                status,
                body,
            }
            .into());
        }

        Ok(response)
    }
}
