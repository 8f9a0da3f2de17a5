// didly-api: Async Rust client for the DID provisioning backend
//
// Wire-level only: requests go out snake_case, responses come back as the
// tolerant `Raw*` shapes in `types`. Turning those into domain values is
// `didly-core`'s job.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::DidClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
