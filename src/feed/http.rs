use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use tracing::{debug, warn};

use super::DocumentFetcher;
use crate::Result;
use crate::config::FeedConfig;
use crate::error::WeatherError;

/// HTTP document fetcher retrying transient failures.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: ClientWithMiddleware,
}

impl HttpFetcher {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("yrweather/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherError::transport(format!("Failed to create HTTP client: {e}")))?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        Ok(Self { client })
    }

    async fn download(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| WeatherError::transport(format!("Request to {url} failed: {e}")))?;

        let response = response
            .error_for_status()
            .map_err(|e| WeatherError::transport(format!("{url} answered with an error: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| WeatherError::transport(format!("Reading body of {url} failed: {e}")))
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String> {
        match tokio::time::timeout(timeout, self.download(url, timeout)).await {
            Ok(result) => {
                if let Ok(body) = &result {
                    debug!(bytes = body.len(), "Downloaded document");
                }
                result
            }
            Err(_) => {
                warn!(?timeout, "Download timed out");
                Err(WeatherError::transport(format!(
                    "Request to {url} timed out after {}s",
                    timeout.as_secs()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(max_retries: u32) -> FeedConfig {
        FeedConfig {
            max_retries,
            ..FeedConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/place/Germany/Hamburg/Hamburg/forecast.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<weatherdata/>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&config(0)).unwrap();
        let url = format!("{}/place/Germany/Hamburg/Hamburg/forecast.xml", server.uri());
        let body = fetcher.fetch(&url, Duration::from_secs(5)).await.unwrap();
        assert_eq!(body, "<weatherdata/>");
    }

    #[tokio::test]
    async fn test_not_found_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&config(0)).unwrap();
        let err = fetcher
            .fetch(&format!("{}/missing", server.uri()), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<weatherdata/>")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&config(0)).unwrap();
        let err = fetcher
            .fetch(&format!("{}/slow", server.uri()), Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
