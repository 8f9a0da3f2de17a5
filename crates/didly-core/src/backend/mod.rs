// ── Backend abstraction ──
//
// The session talks to a `DidBackend`, never to HTTP directly. The real
// provisioning API and the seeded in-memory store both sit behind it, so
// every orchestration path can be exercised without a network.

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::command::ConfigUpdate;
use crate::error::CoreError;
use crate::model::{Customer, OwnedPhoneNumber, PhoneNumber, SearchFilters};
use crate::normalize::Normalized;

pub use http::HttpBackend;
pub use memory::InMemoryBackend;

/// Operations every backend supports. Results are already normalized.
#[async_trait]
pub trait DidBackend: Send + Sync {
    /// Available listings matching `filters`, in backend order.
    async fn search(&self, filters: &SearchFilters) -> Result<Normalized<PhoneNumber>, CoreError>;

    /// Buy a listing by id.
    async fn purchase(&self, id: &str) -> Result<OwnedPhoneNumber, CoreError>;

    /// Everything the caller currently owns, in backend order.
    async fn list_owned(&self) -> Result<Normalized<OwnedPhoneNumber>, CoreError>;

    /// Send exactly the fields in `update`; merge semantics are the backend's.
    async fn update_config(
        &self,
        id: &str,
        update: &ConfigUpdate,
    ) -> Result<OwnedPhoneNumber, CoreError>;

    /// Release an owned number. Unknown ids fail with `NotFound`.
    async fn release(&self, id: &str) -> Result<(), CoreError>;

    /// Liveness probe.
    async fn health(&self) -> Result<(), CoreError>;

    async fn customers(&self) -> Result<Vec<Customer>, CoreError>;

    /// Human-readable label for logs and status lines.
    fn describe(&self) -> String;
}
