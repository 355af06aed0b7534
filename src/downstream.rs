//! Interfaces for layers that consume session output.
//!
//! The session never calls these. An application wires them up itself,
//! for example forwarding every `TableUpdate<Order>` to a message bus or
//! persisting snapshot reads.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Fan-out of decoded responses to other processes.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn publish(&self, topic: &str, payload: Value) -> Result<(), Self::Error>;
}

/// Serializes `dto` and publishes it on `topic`.
pub async fn publish_dto<P, T>(publisher: &P, topic: &str, dto: &T) -> Result<(), PublishError<P::Error>>
where
    P: MessagePublisher + ?Sized,
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_value(dto).map_err(PublishError::Encode)?;
    publisher
        .publish(topic, payload)
        .await
        .map_err(PublishError::Publish)
}

#[derive(thiserror::Error, Debug)]
pub enum PublishError<E: std::error::Error + 'static> {
    #[error("Encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Publish failed: {0}")]
    Publish(#[source] E),
}

/// Persistence of domain entities.
#[async_trait]
pub trait EntityRepository<E>: Send + Sync
where
    E: Send + Sync + 'static,
{
    type Error: std::error::Error + Send + Sync + 'static;

    async fn save(&self, entities: &[E]) -> Result<(), Self::Error>;

    async fn load(&self) -> Result<Vec<E>, Self::Error>;
}
