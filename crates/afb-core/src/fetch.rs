//! Plain-text fetches for the `projects` and `moddl` commands.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::{errors::Error, Result};

#[derive(Clone, Debug)]
pub struct RemoteContentFetcher {
    http: reqwest::Client,
}

impl RemoteContentFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("http client build failed: {e}")))?;
        Ok(Self { http })
    }

    /// GET `url` and return its body on HTTP 200.
    ///
    /// Every other outcome (status, timeout, transport, body decode) is `None`;
    /// callers only care whether content arrived.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        let resp = match self.http.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!(%url, error = %e, "remote fetch failed");
                return None;
            }
        };

        if resp.status() != StatusCode::OK {
            debug!(%url, status = %resp.status(), "remote fetch returned non-200");
            return None;
        }

        match resp.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                debug!(%url, error = %e, "remote fetch body read failed");
                None
            }
        }
    }
}
