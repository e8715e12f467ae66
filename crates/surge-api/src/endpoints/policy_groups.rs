use serde_json::json;

use crate::client::SurgeClient;
use crate::error::Error;
use crate::types::{PolicyGroupDetail, PolicyGroupList};

impl SurgeClient {
    /// Names of all policy groups, in the order Surge reports them.
    ///
    /// `GET /v1/policy_groups`
    pub async fn get_policy_groups(&self) -> Result<Vec<String>, Error> {
        let list: PolicyGroupList = self.get(&["policy_groups"], &[]).await?;
        Ok(list.groups)
    }

    /// Active policy and candidate policies of one group, in a single call.
    ///
    /// `GET /v1/policy_groups/{name}`
    pub async fn get_policy_group(&self, group: &str) -> Result<PolicyGroupDetail, Error> {
        self.get(&["policy_groups", group], &[]).await
    }

    /// `POST /v1/policy_groups/{name}/select` with `{policy}`.
    pub async fn select_policy(&self, group: &str, policy: &str) -> Result<(), Error> {
        self.post(
            &["policy_groups", group, "select"],
            Some(&json!({ "policy": policy })),
        )
        .await
    }
}
