//! [`SessionBuilder`]: configuration plus transport selection.
//!
//! Without explicit transports the builder falls back to the reqwest
//! command channel (feature `http`) and the Socket.IO push stream
//! (feature `ws-native`).

use super::Session;
use crate::config::{ReconnectConfig, SessionConfig};
use crate::error::SdkError;
use crate::http::CommandTransport;
use crate::ws::PushTransport;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
pub struct SessionBuilder {
    config: Option<SessionConfig>,
    host: Option<String>,
    access_token: Option<String>,
    connect_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    reconnect: Option<ReconnectConfig>,
    user_agent: Option<String>,
    command_transport: Option<Arc<dyn CommandTransport>>,
    push_transport: Option<Arc<dyn PushTransport>>,
}

impl SessionBuilder {
    /// Starts from a complete config; individual setters still override it.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    pub fn access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = Some(reconnect);
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    pub fn command_transport(mut self, transport: Arc<dyn CommandTransport>) -> Self {
        self.command_transport = Some(transport);
        self
    }

    pub fn push_transport(mut self, transport: Arc<dyn PushTransport>) -> Self {
        self.push_transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Session, SdkError> {
        let mut config = match self.config {
            Some(config) => config,
            None => {
                let host = self
                    .host
                    .clone()
                    .ok_or_else(|| SdkError::Config("host is required".to_string()))?;
                let token = self
                    .access_token
                    .clone()
                    .ok_or_else(|| SdkError::Config("access token is required".to_string()))?;
                SessionConfig::new(&host, &token)
            }
        };

        if let Some(host) = self.host {
            config.host = host.trim_end_matches('/').to_string();
        }
        if let Some(token) = self.access_token {
            config.access_token = token;
        }
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout = timeout;
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout = timeout;
        }
        if let Some(reconnect) = self.reconnect {
            config.reconnect = reconnect;
        }
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }

        if config.host.is_empty() || config.access_token.is_empty() {
            return Err(SdkError::Config(
                "host and access token must not be empty".to_string(),
            ));
        }

        let commands = match self.command_transport {
            Some(transport) => transport,
            None => default_command_transport(&config)?,
        };
        let push = match self.push_transport {
            Some(transport) => transport,
            None => default_push_transport(&config)?,
        };

        Ok(Session::with_transports(config, commands, push))
    }
}

#[cfg(feature = "http")]
fn default_command_transport(config: &SessionConfig) -> Result<Arc<dyn CommandTransport>, SdkError> {
    let transport = crate::http::ReqwestTransport::new(config.request_timeout)?;
    Ok(Arc::new(transport))
}

#[cfg(not(feature = "http"))]
fn default_command_transport(_: &SessionConfig) -> Result<Arc<dyn CommandTransport>, SdkError> {
    Err(SdkError::Config(
        "no command transport: enable the `http` feature or supply one".to_string(),
    ))
}

#[cfg(feature = "ws-native")]
fn default_push_transport(config: &SessionConfig) -> Result<Arc<dyn PushTransport>, SdkError> {
    Ok(Arc::new(crate::ws::SocketIoTransport::from_config(config)))
}

#[cfg(not(feature = "ws-native"))]
fn default_push_transport(_: &SessionConfig) -> Result<Arc<dyn PushTransport>, SdkError> {
    Err(SdkError::Config(
        "no push transport: enable the `ws-native` feature or supply one".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_host_is_config_error() {
        let err = SessionBuilder::default()
            .access_token("t")
            .build()
            .unwrap_err();
        assert!(matches!(err, SdkError::Config(ref m) if m.contains("host")));
    }

    #[test]
    #[cfg(all(feature = "http", feature = "ws-native"))]
    fn test_setters_override_config() {
        let session = SessionBuilder::default()
            .config(SessionConfig::new("https://a.test", "t1"))
            .host("https://b.test/")
            .request_timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        assert_eq!(session.config().host, "https://b.test");
        assert_eq!(session.config().access_token, "t1");
        assert_eq!(session.config().request_timeout, Duration::from_secs(3));
    }
}
