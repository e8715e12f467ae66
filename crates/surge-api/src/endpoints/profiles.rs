use serde_json::json;

use crate::client::SurgeClient;
use crate::error::Error;
use crate::types::{CurrentProfile, ProfileList, UNKNOWN_PROFILE};

impl SurgeClient {
    /// List the names of all configuration profiles.
    ///
    /// `GET /v1/profiles`. Also serves as the setup-time connectivity probe.
    pub async fn get_profiles(&self) -> Result<Vec<String>, Error> {
        let list: ProfileList = self.get(&["profiles"], &[]).await?;
        Ok(list.profiles)
    }

    /// Name of the active profile, or `"Unknown Profile"` when Surge omits it.
    ///
    /// `GET /v1/profiles/current?sensitive=0`
    pub async fn get_current_profile(&self) -> Result<String, Error> {
        let current: CurrentProfile = self
            .get(&["profiles", "current"], &[("sensitive", "0")])
            .await?;
        Ok(current
            .profile_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_PROFILE.into()))
    }

    /// `POST /v1/profiles/switch` with `{name}`.
    pub async fn switch_profile(&self, name: &str) -> Result<(), Error> {
        self.post(&["profiles", "switch"], Some(&json!({ "name": name })))
            .await
    }

    /// Reload the active profile from disk. `POST /v1/profiles/reload`
    pub async fn reload_profile(&self) -> Result<(), Error> {
        self.post(&["profiles", "reload"], None).await
    }
}
