//! State synchronization between `surge-api` and host integrations.
//!
//! - **[`Session`]**: entry point. [`setup()`](Session::setup) probes the
//!   instance, discovers resources, and starts polling each of them.
//!
//! - **[`Registry`]**: static resources (profile, outbound mode, traffic,
//!   feature toggles) plus policy groups discovered at runtime.
//!
//! - **[`Coordinator`]**: one timer and one cached [`ResourceState`] per
//!   resource, with single-flight refreshes and a manual
//!   [`refresh_now()`](Coordinator::refresh_now).
//!
//! - **[`Dispatcher`]**: validates a [`Command`], sends it, then refreshes
//!   the affected resource so callers see the post-write state.
//!
//! - **[`Resource`]** / **[`ResourceStream`]**: per-resource read, write,
//!   and subscribe handles for hosts.

pub mod command;
pub mod config;
pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod model;
pub mod registry;
pub mod resource;
pub mod session;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::Command;
pub use config::ConnectionConfig;
pub use coordinator::Coordinator;
pub use dispatcher::Dispatcher;
pub use error::{CoreError, ErrorKind};
pub use model::{
    OutboundMode, RefreshPhase, ResourceError, ResourceHandle, ResourceId, ResourceKind,
    ResourceState, ResourceValue,
};
pub use registry::Registry;
pub use resource::Resource;
pub use session::Session;
pub use stream::{ResourceStream, ResourceWatchStream};
