//! HTTP probe implementation.

use std::time::Duration;

use serde::Serialize;

use super::{ProbeError, ProbeResponse};

#[derive(Serialize)]
struct NameCheck<'a> {
    name: &'a str,
}

/// Posts names to the monitored endpoint.
#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| ProbeError::Config(format!("invalid url {:?}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProbeError::Config(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Config(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `{"name": name}` and capture the response.
    ///
    /// Never fails: a request that gets no response is reported as status 0.
    pub async fn check(&self, name: &str) -> ProbeResponse {
        match self.send(name).await {
            Ok(resp) => resp,
            Err(e) => ProbeResponse::transport_failure(&e),
        }
    }

    async fn send(&self, name: &str) -> Result<ProbeResponse, ProbeError> {
        let response = self
            .client
            .post(&self.url)
            .json(&NameCheck { name })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        Ok(ProbeResponse { status, body })
    }

    fn classify(&self, e: reqwest::Error) -> ProbeError {
        if e.is_timeout() {
            ProbeError::Timeout(self.timeout)
        } else {
            ProbeError::Network(e.to_string())
        }
    }
}
