// flowsum-api: Async Rust client for the SD-WAN controller REST API

pub mod auth;
pub mod client;
pub mod directory;
pub mod error;
pub mod flows;
pub mod models;
pub mod transport;

pub use client::{AUTH_TOKEN_HEADER, ApiClient};
pub use error::Error;
pub use flows::MAX_FLOWS_PER_QUERY;
pub use models::{AppDef, FlowFilter, FlowsRequest, OperatorProfile, Site, SourceFilter};
pub use transport::{TlsMode, TransportConfig};
