use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Exchange price band for one instrument. A `None` side means the fetch
/// failed or the venue publishes no bound, and pricing treats that side as
/// unconstrained.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstrumentLimits {
    pub instrument_id: String,
    pub limit_up: Option<Decimal>,
    pub limit_down: Option<Decimal>,
}

impl InstrumentLimits {
    pub fn unavailable(instrument_id: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            limit_up: None,
            limit_down: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.limit_up.is_some() || self.limit_down.is_some()
    }
}
