use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{FailureKind, FetchedResponse, Fetcher, TransportError};

/// `reqwest`-backed fetcher with connection pooling and a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(Self::build_client(timeout)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &crate::config::MonitorConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.request_timeout)
    }

    pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .pool_max_idle_per_host(4)
            .gzip(true)
            .user_agent(concat!("web-monitor/", env!("CARGO_PKG_VERSION")))
            .build()
    }
}

fn classify(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout { url: url.to_string() };
    }
    let kind = if err.is_connect() {
        FailureKind::Connection
    } else if err.is_redirect() {
        FailureKind::Redirect
    } else if err.is_builder() {
        FailureKind::InvalidRequest
    } else if err.is_body() {
        FailureKind::Body
    } else if err.is_decode() {
        FailureKind::Decode
    } else {
        FailureKind::Request
    };
    TransportError::Failed {
        url: url.to_string(),
        kind,
        reason: err.to_string(),
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status().as_u16();
        // the body is part of the exchange: a slow or broken body is a transport failure
        let body = response.text().await.map_err(|e| classify(url, e))?;
        debug!(url, status, bytes = body.len(), "Fetched site");

        Ok(FetchedResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK, service running"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let resp = fetcher
            .fetch(&format!("{}/health", server.uri()))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, "OK, service running");
    }

    #[tokio::test]
    async fn error_status_is_still_a_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let resp = fetcher
            .fetch(&format!("{}/broken", server.uri()))
            .await
            .unwrap();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.body, "maintenance");
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_millis(200)).unwrap();
        let err = fetcher
            .fetch(&format!("{}/slow", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Timeout);
    }

    #[tokio::test]
    async fn refused_connection_is_classified() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:1/").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Connection);
        assert_eq!(err.url(), "http://127.0.0.1:1/");
    }

    #[tokio::test]
    async fn unparseable_url_is_invalid_request() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidRequest);
    }

    #[test]
    fn failure_kind_strings_are_stable() {
        assert_eq!(FailureKind::Timeout.to_string(), "timeout");
        assert_eq!(FailureKind::InvalidRequest.to_string(), "invalid_request");
        assert_eq!(
            serde_json::to_string(&FailureKind::Connection).unwrap(),
            "\"connection\""
        );
    }
}
