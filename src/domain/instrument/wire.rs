//! Wire types for `/trading/get_instruments`.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentRow {
    pub symbol: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstrumentsData {
    #[serde(default)]
    pub instrument: Vec<InstrumentRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstrumentsResponse {
    #[serde(default)]
    pub data: InstrumentsData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::Instrument;
    use serde_json::json;

    #[test]
    fn test_instruments_response() {
        let resp: InstrumentsResponse = serde_json::from_value(json!({
            "response": {"executed": true},
            "data": {"instrument": [
                {"symbol": "EUR/USD", "visible": true, "order": 100},
                {"symbol": "XAU/USD", "visible": false, "order": 3001}
            ]}
        }))
        .unwrap();
        let instruments: Vec<Instrument> = resp.data.instrument.into_iter().map(Into::into).collect();
        assert_eq!(instruments.len(), 2);
        assert_eq!(instruments[0].symbol, "EUR/USD");
        assert!(!instruments[1].visible);
    }

    #[test]
    fn test_missing_data_is_empty() {
        let resp: InstrumentsResponse =
            serde_json::from_value(json!({"response": {"executed": true}})).unwrap();
        assert!(resp.data.instrument.is_empty());
    }
}
