//! `ReqwestTransport`: the command channel over reqwest.

use super::{CommandTransport, HttpRequest, HttpResponse, Method};
use crate::error::HttpError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client, keeping its settings.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommandTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut req = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::Reqwest(e)
            }
        })?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(HttpResponse { status, body })
    }
}

impl Clone for ReqwestTransport {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RequestExecutor;
    use crate::shared::FormParams;
    use mockito::Matcher;
    use std::sync::Arc;

    fn executor(server: &mockito::Server) -> RequestExecutor {
        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        RequestExecutor::new(Arc::new(transport), &server.url(), "sid", "token", "request")
    }

    #[tokio::test]
    async fn test_get_sends_query_and_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/trading/get_model")
            .match_query(Matcher::UrlEncoded("models".into(), "Offer".into()))
            .match_header("authorization", "Bearer sidtoken")
            .match_header("accept", "application/json")
            .match_header("user-agent", "request")
            .with_status(200)
            .with_body(r#"{"response":{"executed":true},"offers":[]}"#)
            .create_async()
            .await;

        let body = executor(&server)
            .execute(Method::Get, "/trading/get_model", &FormParams::new().with("models", "Offer"))
            .await
            .unwrap();
        assert!(body["offers"].is_array());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_sends_form_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/subscribe")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("pairs=EUR%2FUSD")
            .with_status(200)
            .with_body(r#"{"response":{"executed":true},"pairs":[]}"#)
            .create_async()
            .await;

        executor(&server)
            .execute(Method::Post, "/subscribe", &FormParams::new().with("pairs", "EUR/USD"))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_maps_to_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/trading/open_trade")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = executor(&server)
            .execute(Method::Post, "/trading/open_trade", &FormParams::new())
            .await
            .unwrap_err();
        assert!(
            matches!(err, crate::error::SdkError::Http(HttpError::ServerError { status: 500, ref body }) if body == "boom")
        );
    }
}
