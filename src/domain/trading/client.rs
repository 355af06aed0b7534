//! Trading sub-client: order entry and amendment.

use super::codec::TradingCommand;
use super::wire;
use super::{
    ChangeOrder, ChangeOrderStopLimit, ChangeTradeStopLimit, CloseAllForSymbol, CloseTrade,
    CreateEntryOrder, DeleteOrder, EditOco, OpenTrade, SimpleOco,
};
use crate::error::SdkError;
use crate::http::Method;
use crate::session::Session;
use serde_json::Value;

pub struct Trading<'a> {
    pub(crate) session: &'a Session,
}

impl<'a> Trading<'a> {
    async fn post<C: TradingCommand>(&self, command: &C) -> Result<Value, SdkError> {
        let params = command.to_params()?;
        self.session.execute(Method::Post, C::RESOURCE, &params).await
    }

    /// Returns the id of the order that opened the trade.
    pub async fn open_trade(&self, command: &OpenTrade) -> Result<String, SdkError> {
        let body = self.post(command).await?;
        Ok(wire::order_id(&body)?)
    }

    pub async fn close_trade(&self, command: &CloseTrade) -> Result<String, SdkError> {
        let body = self.post(command).await?;
        Ok(wire::order_id(&body)?)
    }

    pub async fn change_order(&self, command: &ChangeOrder) -> Result<(), SdkError> {
        self.post(command).await.map(|_| ())
    }

    pub async fn delete_order(&self, command: &DeleteOrder) -> Result<(), SdkError> {
        self.post(command).await.map(|_| ())
    }

    pub async fn create_entry_order(&self, command: &CreateEntryOrder) -> Result<String, SdkError> {
        let body = self.post(command).await?;
        Ok(wire::order_id(&body)?)
    }

    /// Returns the ids of both legs.
    pub async fn simple_oco(&self, command: &SimpleOco) -> Result<Vec<String>, SdkError> {
        let body = self.post(command).await?;
        Ok(wire::order_ids(&body))
    }

    pub async fn edit_oco(&self, command: &EditOco) -> Result<(), SdkError> {
        self.post(command).await.map(|_| ())
    }

    pub async fn change_trade_stop_limit(
        &self,
        command: &ChangeTradeStopLimit,
    ) -> Result<(), SdkError> {
        self.post(command).await.map(|_| ())
    }

    pub async fn change_order_stop_limit(
        &self,
        command: &ChangeOrderStopLimit,
    ) -> Result<Vec<String>, SdkError> {
        let body = self.post(command).await?;
        Ok(wire::order_ids(&body))
    }

    /// Returns the ids of the closing orders.
    pub async fn close_all_for_symbol(
        &self,
        command: &CloseAllForSymbol,
    ) -> Result<Vec<String>, SdkError> {
        let body = self.post(command).await?;
        Ok(wire::order_ids(&body))
    }
}
