// Endpoint methods, one file per API area, all implemented as inherent
// methods on `SurgeClient`.

mod features;
mod outbound;
mod policy_groups;
mod profiles;
mod traffic;
