use serde_json::json;

use crate::client::SurgeClient;
use crate::error::Error;
use crate::types::FeatureState;

impl SurgeClient {
    /// Whether a feature (`mitm`, `capture`, `system_proxy`, ...) is enabled.
    ///
    /// `GET /v1/features/{feature}`. Surge answers 404 for features the
    /// running build does not have (the macOS-only ones on iOS).
    pub async fn get_feature(&self, feature: &str) -> Result<bool, Error> {
        let state: FeatureState = self.get(&["features", feature], &[]).await?;
        Ok(state.enabled)
    }

    /// `POST /v1/features/{feature}` with `{enabled}`.
    pub async fn set_feature(&self, feature: &str, enabled: bool) -> Result<(), Error> {
        self.post(&["features", feature], Some(&json!({ "enabled": enabled })))
            .await
    }
}
