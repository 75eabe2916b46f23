use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use dogshare_core::{LinkShortener, ShareError, ShareResult};

/// Client for the YOURLS `yourls-api.php` endpoint.
///
/// Every call is a single form-encoded POST authenticated with the
/// signature token. Nothing is retried.
#[derive(Debug, Clone)]
pub struct YourlsClient {
    endpoint: Url,
    signature: String,
    client: Client,
}

impl YourlsClient {
    pub fn new<S: Into<String>>(endpoint: &str, signature: S) -> ShareResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ShareError::config(format!("invalid YOURLS endpoint '{endpoint}': {e}")))?;
        Ok(Self {
            endpoint,
            signature: signature.into(),
            client: Client::new(),
        })
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, TLS)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Shorten `long_url` under a fresh random keyword.
    ///
    /// YOURLS links never expire, so the short link outlives any presigned
    /// URL it points at.
    pub async fn shorten(&self, long_url: &str, title: &str) -> ShareResult<String> {
        let target = Url::parse(long_url)
            .map_err(|e| ShareError::shorten_with(format!("invalid url '{long_url}'"), e))?;
        let keyword = new_keyword();

        let response = self
            .api_request(&[
                ("action", "shorturl"),
                ("format", "json"),
                ("url", target.as_str()),
                ("title", title),
                ("keyword", &keyword),
            ])
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ShareError::shorten(format!(
                "unexpected status code: {} ({})",
                status.as_u16(),
                error_message(&body).unwrap_or_else(|| status.to_string())
            )));
        }

        let body: ShortenResponse = response
            .json()
            .await
            .map_err(|e| ShareError::shorten_with("could not decode response", e))?;

        match body.shorturl {
            Some(link) if !link.is_empty() => {
                debug!(keyword = %keyword, short_link = %link, "shortened url");
                Ok(link)
            }
            _ => Err(ShareError::shorten(format!(
                "response has no shorturl{}",
                body.message.map(|m| format!(": {m}")).unwrap_or_default()
            ))),
        }
    }

    async fn api_request(&self, fields: &[(&str, &str)]) -> ShareResult<reqwest::Response> {
        let mut form: Vec<(&str, &str)> = Vec::with_capacity(fields.len() + 1);
        form.push(("signature", &self.signature));
        form.extend_from_slice(fields);

        self.client
            .post(self.endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| ShareError::shorten_with("request failed", e))
    }
}

#[async_trait]
impl LinkShortener for YourlsClient {
    async fn shorten(&self, long_url: &str, title: &str) -> ShareResult<String> {
        YourlsClient::shorten(self, long_url, title).await
    }
}

/// Random slug. Hex only, so it survives YOURLS keyword sanitizing.
fn new_keyword() -> String {
    Uuid::new_v4().simple().to_string()
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ShortenResponse>(body)
        .ok()
        .and_then(|r| r.message)
}

/// `action=shorturl` response. Only `shorturl` is used, the rest is kept for logging.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ShortenResponse {
    #[serde(default)]
    url: Option<ShortenedUrl>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    shorturl: Option<String>,
    #[serde(default, rename = "statusCode")]
    status_code: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ShortenedUrl {
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    ip: Option<String>,
}
