// surge-api: Async Rust client for the Surge HTTP API

pub mod client;
mod endpoints;
pub mod error;
pub mod transport;
pub mod types;

pub use client::SurgeClient;
pub use error::Error;
pub use reqwest::Method;
pub use transport::{TlsMode, TransportConfig};
pub use types::{PolicyGroupDetail, TrafficStats};
