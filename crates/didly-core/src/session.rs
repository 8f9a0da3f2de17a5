// ── Session ──
//
// Central facade for CLI and TUI. Owns the backend, the owned-number
// store, and the background health probe. Cheaply cloneable.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use didly_api::{DidClient, TlsMode, TransportConfig};

use crate::backend::{DidBackend, HttpBackend, InMemoryBackend};
use crate::command::{Command, CommandResult};
use crate::config::{BackendTarget, SessionConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Customer, HealthStatus, PhoneNumber, SearchFilters};
use crate::normalize::{Normalized, NormalizerConfig};
use crate::store::{OwnedSnapshot, OwnedStore};

/// The main entry point for consumers.
///
/// Every mutation is followed by an unconditional re-fetch of the owned
/// collection; nothing is patched into the store locally.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    backend: Arc<dyn DidBackend>,
    store: Arc<OwnedStore>,
    health: watch::Sender<HealthStatus>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    /// Ids with a mutation currently in flight.
    in_flight: StdMutex<HashSet<String>>,
    /// Records skipped during normalization, for the caller to surface.
    warnings: Mutex<Vec<String>>,
}

impl Session {
    /// Build a session for the configured backend. Does not touch the
    /// network.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let backend: Arc<dyn DidBackend> = match &config.backend {
            BackendTarget::Remote { url, token } => {
                let client = DidClient::new(url.as_str(), token.as_ref(), &build_transport(&config))?;
                Arc::new(HttpBackend::new(
                    client,
                    NormalizerConfig {
                        currency: config.currency.clone(),
                    },
                    config.provisioning.clone(),
                ))
            }
            BackendTarget::InMemory => Arc::new(InMemoryBackend::seeded(&config.currency)),
        };
        Ok(Self::with_backend(config, backend))
    }

    /// Build a session around an existing backend.
    pub fn with_backend(config: SessionConfig, backend: Arc<dyn DidBackend>) -> Self {
        let (health, _) = watch::channel(HealthStatus::Checking);
        Self {
            inner: Arc::new(SessionInner {
                config,
                backend,
                store: Arc::new(OwnedStore::new()),
                health,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
                in_flight: StdMutex::new(HashSet::new()),
                warnings: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<OwnedStore> {
        &self.inner.store
    }

    pub fn backend_label(&self) -> String {
        self.inner.backend.describe()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Search available listings. Filters are validated locally first; an
    /// invalid filter never reaches the backend.
    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<PhoneNumber>, CoreError> {
        let filters = filters.validated()?;
        debug!(?filters, "searching");
        let result = self
            .inner
            .backend
            .search(&filters)
            .await
            .map_err(|e| self.observe(e))?;
        Ok(self.keep_warnings(result).await)
    }

    /// Re-fetch the owned collection into the store.
    pub async fn refresh_owned(&self) -> Result<OwnedSnapshot, CoreError> {
        let result = self
            .inner
            .backend
            .list_owned()
            .await
            .map_err(|e| self.observe(e))?;
        let owned = self.keep_warnings(result).await;
        self.inner.store.replace_all(owned);
        Ok(self.inner.store.snapshot())
    }

    pub async fn customers(&self) -> Result<Vec<Customer>, CoreError> {
        self.inner
            .backend
            .customers()
            .await
            .map_err(|e| self.observe(e))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run a mutation, then re-fetch the owned collection.
    ///
    /// A failed re-fetch after a successful mutation is logged, not
    /// returned: the mutation itself did happen.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if let Command::UpdateConfig { update, .. } = &cmd {
            update.validate()?;
        }
        let _guard = InFlight::acquire(&self.inner.in_flight, cmd.id())?;

        let backend = &self.inner.backend;
        let result = match cmd {
            Command::Purchase { id } => {
                info!(id = %id, "purchasing number");
                backend.purchase(&id).await.map(CommandResult::Purchased)
            }
            Command::UpdateConfig { id, update } => {
                info!(id = %id, "updating number configuration");
                backend
                    .update_config(&id, &update)
                    .await
                    .map(CommandResult::Updated)
            }
            Command::Release { id } => {
                info!(id = %id, "releasing number");
                backend
                    .release(&id)
                    .await
                    .map(|()| CommandResult::Released { id })
            }
        }
        .map_err(|e| self.observe(e))?;

        if let Err(e) = self.refresh_owned().await {
            warn!(error = %e, "owned refresh after mutation failed");
        }
        Ok(result)
    }

    // ── Health ───────────────────────────────────────────────────────

    /// A call that could not reach the backend marks it offline right
    /// away instead of waiting for the next probe.
    fn observe(&self, err: CoreError) -> CoreError {
        if err.is_offline() {
            self.inner.health.send_if_modified(|status| {
                let changed = *status != HealthStatus::Offline;
                *status = HealthStatus::Offline;
                changed
            });
        }
        err
    }

    /// Subscribe to health status changes.
    pub fn health(&self) -> watch::Receiver<HealthStatus> {
        self.inner.health.subscribe()
    }

    /// Run one probe and publish the result.
    pub async fn check_health(&self) -> HealthStatus {
        let status = match self.inner.backend.health().await {
            Ok(()) => HealthStatus::Online,
            Err(e) => {
                debug!(error = %e, "health probe failed");
                HealthStatus::Offline
            }
        };
        self.inner.health.send_replace(status);
        status
    }

    /// Spawn the periodic health probe. No-op when the interval is zero.
    pub async fn start_health_probe(&self) {
        let period = self.inner.config.health_interval;
        if period.is_zero() {
            return;
        }
        let handle = tokio::spawn(health_probe_task(
            self.clone(),
            period,
            self.inner.cancel.child_token(),
        ));
        self.inner.task_handles.lock().await.push(handle);
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Cancel background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let handles: Vec<_> = self.inner.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
        debug!("session shut down");
    }

    /// Forget everything fetched so far.
    pub fn reset(&self) {
        self.inner.store.clear();
        self.inner.health.send_replace(HealthStatus::Checking);
    }

    /// Drain warnings about skipped backend records.
    pub async fn take_warnings(&self) -> Vec<String> {
        std::mem::take(&mut *self.inner.warnings.lock().await)
    }

    /// Build a session, run `f`, shut down. For single CLI invocations.
    pub async fn oneshot<F, Fut, T>(config: SessionConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Session) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let session = Session::new(config)?;
        let result = f(session.clone()).await;
        session.shutdown().await;
        result
    }

    async fn keep_warnings<T>(&self, result: Normalized<T>) -> Vec<T> {
        if !result.skipped.is_empty() {
            let mut warnings = self.inner.warnings.lock().await;
            warnings.extend(result.skipped.iter().map(ToString::to_string));
        }
        result.items
    }
}

// ── In-flight guard ──────────────────────────────────────────────────

/// Marks a number as having a mutation in flight until dropped.
struct InFlight<'a> {
    set: &'a StdMutex<HashSet<String>>,
    id: String,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a StdMutex<HashSet<String>>, id: &str) -> Result<Self, CoreError> {
        let mut ids = set
            .lock()
            .map_err(|_| CoreError::Internal("in-flight set poisoned".into()))?;
        if !ids.insert(id.to_owned()) {
            return Err(CoreError::Busy { id: id.to_owned() });
        }
        Ok(Self {
            set,
            id: id.to_owned(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut ids) = self.set.lock() {
            ids.remove(&self.id);
        }
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Probe immediately, then every `period`, until cancelled.
async fn health_probe_task(session: Session, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let status = session.check_health().await;
                debug!(%status, "health probe");
            }
        }
    }
}

fn build_transport(config: &SessionConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}
