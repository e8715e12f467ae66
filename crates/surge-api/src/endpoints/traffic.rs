use crate::client::SurgeClient;
use crate::error::Error;
use crate::types::{TrafficCounters, TrafficStats};

impl SurgeClient {
    /// Cumulative upload/download, converted with [`TrafficStats::from_bytes`].
    ///
    /// `GET /v1/traffic`
    pub async fn get_traffic(&self) -> Result<TrafficStats, Error> {
        let raw: TrafficCounters = self.get(&["traffic"], &[]).await?;
        Ok(raw.into())
    }
}
