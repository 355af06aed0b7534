//! Instruments sub-client.

use super::wire::InstrumentsResponse;
use super::Instrument;
use crate::error::SdkError;
use crate::http::Method;
use crate::network::resource;
use crate::session::Session;
use crate::shared::FormParams;

pub struct Instruments<'a> {
    pub(crate) session: &'a Session,
}

impl<'a> Instruments<'a> {
    /// Every instrument the account can trade, visible or not.
    pub async fn get(&self) -> Result<Vec<Instrument>, SdkError> {
        let body = self
            .session
            .execute(Method::Get, resource::GET_INSTRUMENTS, &FormParams::new())
            .await?;
        let response: InstrumentsResponse = serde_json::from_value(body)?;
        Ok(response.data.instrument.into_iter().map(Into::into).collect())
    }
}
