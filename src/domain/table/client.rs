//! Tables sub-client: table subscriptions and snapshot reads.

use super::{
    snapshot_rows, Account, ClosedPosition, Offer, OpenPosition, Order, Summary, TableEntity,
};
use crate::error::SdkError;
use crate::http::Method;
use crate::network::resource;
use crate::session::Session;
use crate::shared::{FormParams, TradingTable};

pub struct Tables<'a> {
    pub(crate) session: &'a Session,
}

impl<'a> Tables<'a> {
    /// Starts pushing deltas of `table`.
    ///
    /// The subscribe command is sent even if the table is already
    /// subscribed; the topic callback is registered only once.
    pub async fn subscribe(&self, table: TradingTable) -> Result<(), SdkError> {
        let params = FormParams::new().with("models", table.as_str());
        self.session
            .execute(Method::Post, resource::TRADING_SUBSCRIBE, &params)
            .await?;
        self.session.register_table(table).await;
        Ok(())
    }

    pub async fn unsubscribe(&self, table: TradingTable) -> Result<(), SdkError> {
        let params = FormParams::new().with("models", table.as_str());
        self.session
            .execute(Method::Post, resource::TRADING_UNSUBSCRIBE, &params)
            .await?;
        self.session.unregister_table(table).await;
        Ok(())
    }

    /// Shows or hides `symbol` in the Offers table.
    pub async fn update_subscriptions(&self, symbol: &str, visible: bool) -> Result<(), SdkError> {
        let mut params = FormParams::new();
        params.push("symbol", symbol).push_bool("visible", visible);
        self.session
            .execute(Method::Post, resource::UPDATE_SUBSCRIPTIONS, &params)
            .await?;
        Ok(())
    }

    /// Current rows of `E`'s table.
    pub async fn get<E: TableEntity>(&self) -> Result<Vec<E>, SdkError> {
        let params = FormParams::new().with("models", E::TABLE.as_str());
        let body = self
            .session
            .execute(Method::Get, resource::GET_MODEL, &params)
            .await?;
        Ok(snapshot_rows(&body)?)
    }

    pub async fn get_offers(&self) -> Result<Vec<Offer>, SdkError> {
        self.get().await
    }

    pub async fn get_open_positions(&self) -> Result<Vec<OpenPosition>, SdkError> {
        self.get().await
    }

    pub async fn get_closed_positions(&self) -> Result<Vec<ClosedPosition>, SdkError> {
        self.get().await
    }

    pub async fn get_orders(&self) -> Result<Vec<Order>, SdkError> {
        self.get().await
    }

    pub async fn get_accounts(&self) -> Result<Vec<Account>, SdkError> {
        self.get().await
    }

    pub async fn get_summary(&self) -> Result<Vec<Summary>, SdkError> {
        self.get().await
    }
}
