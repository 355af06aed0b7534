//! `RequestExecutor`: builds, sends and decodes one command.

use super::{CommandTransport, HttpRequest, Method};
use crate::error::{HttpError, SdkError};
use crate::shared::FormParams;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// `{"response": {"executed": bool, "error": string}}` header of every reply.
#[derive(Debug, Clone, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    response: Option<ResponseStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ResponseStatus {
    #[serde(default)]
    executed: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Fails with `CommandExecution` unless the envelope reports `executed=true`.
///
/// A body without an envelope counts as not executed.
pub fn check_envelope(body: &Value) -> Result<(), SdkError> {
    let envelope = Envelope::deserialize(body).unwrap_or_default();
    match envelope.response {
        Some(status) if status.executed => Ok(()),
        Some(status) => Err(SdkError::command_failed(status.error.as_deref())),
        None => Err(SdkError::command_failed(None)),
    }
}

/// Issues commands against one host / session id / access token triple.
///
/// Bound to a single push-stream session: when the stream reconnects under
/// a new session id, the session builds a new executor.
#[derive(Clone)]
pub struct RequestExecutor {
    host: String,
    session_id: String,
    access_token: String,
    user_agent: String,
    transport: Arc<dyn CommandTransport>,
}

impl RequestExecutor {
    pub fn new(
        transport: Arc<dyn CommandTransport>,
        host: &str,
        session_id: &str,
        access_token: &str,
        user_agent: &str,
    ) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            session_id: session_id.to_string(),
            access_token: access_token.to_string(),
            user_agent: user_agent.to_string(),
            transport,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// `Bearer {sessionId}{accessToken}`.
    pub fn authorization(&self) -> String {
        format!("Bearer {}{}", self.session_id, self.access_token)
    }

    /// `GET` carries `params` in the query string, anything else in a
    /// form-encoded body.
    pub fn build_request(&self, method: Method, resource: &str, params: &FormParams) -> HttpRequest {
        let mut url = format!("{}{}", self.host, resource);
        let mut body = None;
        match method {
            Method::Get => {
                if !params.is_empty() {
                    url = format!("{}?{}", url, params.encode());
                }
            }
            Method::Post => body = Some(params.encode()),
        }

        HttpRequest {
            method,
            url,
            headers: vec![
                ("Accept".into(), "application/json".into()),
                (
                    "Content-Type".into(),
                    "application/x-www-form-urlencoded".into(),
                ),
                ("User-Agent".into(), self.user_agent.clone()),
                ("Authorization".into(), self.authorization()),
            ],
            body,
        }
    }

    /// Sends the command and parses the body, without looking at the envelope.
    ///
    /// Non-2xx answers fail with `HttpError::ServerError`.
    pub async fn send(
        &self,
        method: Method,
        resource: &str,
        params: &FormParams,
    ) -> Result<Value, SdkError> {
        let request = self.build_request(method, resource, params);
        tracing::debug!(method = %method, url = %request.url, "sending command");

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            tracing::debug!(status = response.status, resource, "command rejected");
            return Err(HttpError::ServerError {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body)
            .map_err(|e| HttpError::InvalidBody(e.to_string()).into())
    }

    /// Sends the command and fails unless the server executed it.
    pub async fn execute(
        &self,
        method: Method,
        resource: &str,
        params: &FormParams,
    ) -> Result<Value, SdkError> {
        let body = self.send(method, resource, params).await?;
        check_envelope(&body)?;
        Ok(body)
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("host", &self.host)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct Scripted {
        response: HttpResponse,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: HttpResponse {
                    status,
                    body: body.to_string(),
                },
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CommandTransport for Scripted {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.seen.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn executor(transport: Arc<Scripted>) -> RequestExecutor {
        RequestExecutor::new(transport, "https://api-demo.fxcm.com/", "s1", "tok", "request")
    }

    #[test]
    fn test_get_uses_query_string() {
        let exec = executor(Scripted::new(200, "{}"));
        let params = FormParams::new().with("models", "Offer");
        let req = exec.build_request(Method::Get, "/trading/get_model", &params);
        assert_eq!(req.url, "https://api-demo.fxcm.com/trading/get_model?models=Offer");
        assert!(req.body.is_none());
        assert_eq!(req.header("authorization"), Some("Bearer s1tok"));
        assert_eq!(req.header("User-Agent"), Some("request"));
    }

    #[test]
    fn test_post_uses_form_body() {
        let exec = executor(Scripted::new(200, "{}"));
        let params = FormParams::new().with("pairs", "EUR/USD");
        let req = exec.build_request(Method::Post, "/subscribe", &params);
        assert_eq!(req.url, "https://api-demo.fxcm.com/subscribe");
        assert_eq!(req.body.as_deref(), Some("pairs=EUR%2FUSD"));
        assert_eq!(
            req.header("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[tokio::test]
    async fn test_executed_response_returns_body() {
        let transport = Scripted::new(200, r#"{"response":{"executed":true},"data":{"orderId":"7"}}"#);
        let body = executor(transport.clone())
            .execute(Method::Post, "/trading/open_trade", &FormParams::new())
            .await
            .unwrap();
        assert_eq!(body["data"]["orderId"], "7");
        assert_eq!(transport.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_not_executed_carries_server_message() {
        let transport = Scripted::new(200, r#"{"response":{"executed":false,"error":"Unknown order"}}"#);
        let err = executor(transport)
            .execute(Method::Post, "/trading/delete_order", &FormParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Command failed: Unknown order");
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let transport = Scripted::new(401, "unauthorized");
        let err = executor(transport)
            .execute(Method::Get, "/trading/get_model", &FormParams::new())
            .await
            .unwrap_err();
        match err {
            SdkError::Http(HttpError::ServerError { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_skips_envelope_check() {
        let transport = Scripted::new(200, r#"{"response":{"executed":false}}"#);
        let body = executor(transport)
            .send(Method::Post, "/unsubscribe", &FormParams::new())
            .await
            .unwrap();
        assert!(check_envelope(&body).unwrap_err().is_command_failure());
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let transport = Scripted::new(200, "<html>");
        let err = executor(transport)
            .send(Method::Get, "/x", &FormParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Http(HttpError::InvalidBody(_))));
    }

    #[test]
    fn test_empty_body_is_null() {
        let transport = Scripted::new(204, "  ");
        let body = tokio_test::block_on(executor(transport).send(
            Method::Post,
            "/trading/update_subscriptions",
            &FormParams::new(),
        ));
        assert_eq!(body.unwrap(), Value::Null);
    }

    #[test]
    fn test_missing_envelope_is_failure() {
        match check_envelope(&json!({"data": []})).unwrap_err() {
            SdkError::CommandExecution { message } => assert_eq!(message, "Request failed"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(check_envelope(&Value::Null).is_err());
    }
}
