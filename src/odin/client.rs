use reqwest::header::{ACCEPT, AUTHORIZATION};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// A transport-level failure: nothing came back from the API.
#[derive(Debug, Error)]
#[error("{cause}")]
pub struct TransportError {
    pub cause: String,
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            cause: e.to_string(),
        }
    }
}

/// A completed HTTP exchange. Non-2xx statuses are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOutcome {
    pub status: u16,
    pub body: String,
}

impl HttpOutcome {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Thin client for the 0DIN threat-feed endpoint.
///
/// Cloning is cheap; the underlying `reqwest::Client` shares its pool.
#[derive(Clone, Debug)]
pub struct ThreatFeedClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ThreatFeedClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `<base-url><id>`. The id is expected to be validated already.
    pub async fn fetch_submission(
        &self,
        id: &str,
        credential: &str,
    ) -> Result<HttpOutcome, TransportError> {
        let url = format!("{}{}", self.base_url, id);
        self.get(&url, credential).await
    }

    /// GET the bare base URL, which lists the whole feed.
    pub async fn fetch_feed(&self, credential: &str) -> Result<HttpOutcome, TransportError> {
        let url = self.base_url.clone();
        self.get(&url, credential).await
    }

    async fn get(&self, url: &str, credential: &str) -> Result<HttpOutcome, TransportError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, credential)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        info!("API request to {} returned status {}", url, status);

        let body = response.text().await?;
        Ok(HttpOutcome { status, body })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::silent_server;
    use super::*;
    use std::time::Instant;

    fn client_for(server: &mockito::ServerGuard) -> ThreatFeedClient {
        ThreatFeedClient::new(
            reqwest::Client::new(),
            format!("{}/api/v1/threatfeed/", server.url()),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_fetch_sends_raw_credential_and_accept_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/threatfeed/abc")
            .match_header("accept", "application/json")
            .match_header("authorization", "secret-key")
            .with_status(200)
            .with_body(r#"{"metadata":[]}"#)
            .create_async()
            .await;

        let outcome = client_for(&server)
            .fetch_submission("abc", "secret-key")
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(outcome.is_ok());
        assert_eq!(outcome.body, r#"{"metadata":[]}"#);
    }

    #[tokio::test]
    async fn test_non_success_status_is_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/threatfeed/missing")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let outcome = client_for(&server)
            .fetch_submission("missing", "key")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(outcome.status, 404);
        assert_eq!(outcome.body, "Not Found");
        assert!(!outcome.is_ok());
    }

    #[tokio::test]
    async fn test_feed_hits_base_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/threatfeed/")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let outcome = client_for(&server).fetch_feed("key").await.unwrap();

        mock.assert_async().await;
        assert_eq!(outcome.body, "[]");
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // Nothing listens on port 9 of the loopback interface.
        let client = ThreatFeedClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/",
            Duration::from_secs(2),
        );

        let err = client.fetch_submission("abc", "key").await.unwrap_err();
        assert!(!err.cause.is_empty());
    }

    #[tokio::test]
    async fn test_unresponsive_server_times_out() {
        let client = ThreatFeedClient::new(
            reqwest::Client::new(),
            silent_server().await,
            Duration::from_secs(1),
        );

        let started = Instant::now();
        let err = client.fetch_submission("abc", "key").await.unwrap_err();

        assert!(!err.cause.is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
