//! Prices sub-client: market data subscriptions.

use super::PriceUpdate;
use crate::error::SdkError;
use crate::http::{executor, Method};
use crate::network::resource;
use crate::session::Session;
use crate::shared::FormParams;

pub struct Prices<'a> {
    pub(crate) session: &'a Session,
}

impl<'a> Prices<'a> {
    /// Subscribes `symbol` and returns its latest quote, if the server sent one.
    ///
    /// The subscribe command is always sent; a repeated subscription keeps a
    /// single topic callback. Updates are delivered to `Session::on_price`.
    pub async fn subscribe(&self, symbol: &str) -> Result<Option<PriceUpdate>, SdkError> {
        let params = FormParams::new().with("pairs", symbol);
        let body = self
            .session
            .execute(Method::Post, resource::SUBSCRIBE, &params)
            .await?;
        self.session.register_symbol(symbol).await;

        match body.get("pairs").and_then(|pairs| pairs.get(0)) {
            Some(first) => Ok(Some(PriceUpdate::from_price_value(first)?)),
            None => Ok(None),
        }
    }

    /// Unsubscribes `symbol`.
    ///
    /// Once the server has answered, the local subscription is dropped even
    /// if the server reports the command as not executed; that failure is
    /// returned afterwards.
    pub async fn unsubscribe(&self, symbol: &str) -> Result<(), SdkError> {
        let params = FormParams::new().with("pairs", symbol);
        let body = self
            .session
            .send(Method::Post, resource::UNSUBSCRIBE, &params)
            .await?;
        self.session.unregister_symbol(symbol).await;
        executor::check_envelope(&body)
    }
}
