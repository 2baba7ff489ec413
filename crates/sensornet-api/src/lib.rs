// sensornet-api: Async Rust client for the sensornet dashboard server
//
// Thin, loosely-typed wrappers over the REST endpoints plus the
// auto-reconnecting websocket push channel. Domain typing happens in
// `sensornet-core`.

pub mod client;
pub mod devices;
pub mod error;
pub mod history;
pub mod models;
pub mod push;
pub mod sensors;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use push::{PushHandle, PushStatus, ReconnectConfig};
pub use transport::{TlsMode, TransportConfig};
