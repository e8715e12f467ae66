use serde_json::json;

use crate::client::SurgeClient;
use crate::error::Error;
use crate::types::{OutboundState, UNKNOWN_MODE};

impl SurgeClient {
    /// Current outbound mode as reported by Surge (`direct`, `proxy`, `rule`).
    ///
    /// `GET /v1/outbound`. Returns `"unknown"` if the field is missing.
    pub async fn get_outbound_mode(&self) -> Result<String, Error> {
        let state: OutboundState = self.get(&["outbound"], &[]).await?;
        Ok(state.mode.unwrap_or_else(|| UNKNOWN_MODE.into()))
    }

    /// `POST /v1/outbound` with `{mode}`.
    ///
    /// The mode is sent as given; rejecting values outside
    /// `direct | proxy | rule` is the caller's job so that invalid input
    /// never costs a round trip.
    pub async fn set_outbound_mode(&self, mode: &str) -> Result<(), Error> {
        self.post(&["outbound"], Some(&json!({ "mode": mode }))).await
    }
}
