use lexrelay_core::{ProviderMessage, build_http_client};
use reqwest::{Client, Response};
use serde::Serialize;

/// Body sent to the model provider
#[derive(Debug, Serialize)]
struct ProviderRequest<'a> {
    model: &'a str,
    messages: &'a [ProviderMessage],
    stream: bool,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http_client: Client,
    url: String,
    api_key: Option<String>,
}

impl UpstreamClient {
    pub fn new(url: &str, api_key: Option<String>) -> Self {
        Self {
            http_client: build_http_client(),
            url: url.to_string(),
            api_key,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open one streaming request to the provider. The body is not read.
    pub async fn open(
        &self,
        model: &str,
        messages: &[ProviderMessage],
    ) -> reqwest::Result<Response> {
        let mut request = self
            .http_client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&ProviderRequest {
                model,
                messages,
                stream: true,
            });

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        request.send().await
    }
}
