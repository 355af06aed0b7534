//! Candles sub-client: historical data.

use super::wire::CandlesResponse;
use super::{Candle, MAX_CANDLES, MIN_CANDLES};
use crate::error::SdkError;
use crate::http::Method;
use crate::network::resource;
use crate::session::Session;
use crate::shared::{FormParams, Timeframe};
use chrono::{DateTime, Utc};

pub struct Candles<'a> {
    pub(crate) session: &'a Session,
}

impl<'a> Candles<'a> {
    /// Up to `count` candles for `offer_id`, in the order the server sent them.
    ///
    /// `from` and `to` bound the range and are only sent when given.
    pub async fn get(
        &self,
        offer_id: i32,
        timeframe: Timeframe,
        count: u32,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Candle>, SdkError> {
        if !(MIN_CANDLES..=MAX_CANDLES).contains(&count) {
            return Err(SdkError::Validation(format!(
                "candle count must be within {}..={}, got {}",
                MIN_CANDLES, MAX_CANDLES, count
            )));
        }

        let mut params = FormParams::new();
        params.push_int("num", count.into());
        if let Some(from) = from {
            params.push_int("from", from.timestamp());
        }
        if let Some(to) = to {
            params.push_int("to", to.timestamp());
        }

        let path = format!("{}/{}/{}", resource::CANDLES, offer_id, timeframe.as_str());
        let body = self.session.execute(Method::Get, &path, &params).await?;
        let response: CandlesResponse = serde_json::from_value(body)?;
        Ok(response.into_candles()?)
    }
}
