// ── In-memory backend ──
//
// A seeded, self-contained provisioning backend for demos and tests.
// Each instance owns its own state: construct one per session and drop
// it (or call `reset`) to start over.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use didly_api::types::{RawCapabilities, RawDid, Scalar};

use super::DidBackend;
use crate::command::ConfigUpdate;
use crate::error::CoreError;
use crate::model::{Customer, OwnedPhoneNumber, PhoneNumber, SearchFilters};
use crate::normalize::{Normalized, NormalizerConfig, normalize_all, normalize_listing};

struct MemoryState {
    /// Every listing this backend knows, owned or not.
    catalog: Vec<PhoneNumber>,
    /// Owned numbers in purchase order.
    owned: Vec<OwnedPhoneNumber>,
}

pub struct InMemoryBackend {
    state: Mutex<MemoryState>,
    currency: String,
    online: AtomicBool,
}

impl InMemoryBackend {
    /// Seeded with the demo catalog, nothing owned.
    pub fn seeded(currency: &str) -> Self {
        Self::with_catalog(fixture_listings(currency), currency)
    }

    pub fn with_catalog(catalog: Vec<PhoneNumber>, currency: &str) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                catalog,
                owned: Vec::new(),
            }),
            currency: currency.to_owned(),
            online: AtomicBool::new(true),
        }
    }

    /// Simulate the backend going away (health probe reports offline and
    /// every call fails with a transport error).
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Drop every owned number and restore the seeded catalog.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.catalog = fixture_listings(&self.currency);
        state.owned.clear();
    }

    fn ensure_online(&self) -> Result<(), CoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CoreError::Transport {
                reason: "in-memory backend is offline".into(),
            })
        }
    }
}

fn not_found() -> CoreError {
    CoreError::NotFound {
        message: "Number not found".into(),
    }
}

#[async_trait]
impl DidBackend for InMemoryBackend {
    async fn search(&self, filters: &SearchFilters) -> Result<Normalized<PhoneNumber>, CoreError> {
        self.ensure_online()?;
        let state = self.state.lock().await;
        let items = state
            .catalog
            .iter()
            .filter(|n| !state.owned.iter().any(|o| o.id() == n.id))
            .filter(|n| filters.matches(n))
            .cloned()
            .collect();
        Ok(Normalized {
            items,
            skipped: Vec::new(),
        })
    }

    async fn purchase(&self, id: &str) -> Result<OwnedPhoneNumber, CoreError> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        if state.owned.iter().any(|o| o.id() == id) {
            return Err(CoreError::Remote {
                status: 409,
                message: "Number already owned".into(),
            });
        }
        let listing = state
            .catalog
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(not_found)?;
        let owned = OwnedPhoneNumber::purchased(listing, Utc::now());
        state.owned.push(owned.clone());
        Ok(owned)
    }

    async fn list_owned(&self) -> Result<Normalized<OwnedPhoneNumber>, CoreError> {
        self.ensure_online()?;
        let state = self.state.lock().await;
        Ok(Normalized {
            items: state.owned.clone(),
            skipped: Vec::new(),
        })
    }

    async fn update_config(
        &self,
        id: &str,
        update: &ConfigUpdate,
    ) -> Result<OwnedPhoneNumber, CoreError> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        let owned = state
            .owned
            .iter_mut()
            .find(|o| o.id() == id)
            .ok_or_else(not_found)?;
        update.apply_to(owned);
        Ok(owned.clone())
    }

    async fn release(&self, id: &str) -> Result<(), CoreError> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        let before = state.owned.len();
        state.owned.retain(|o| o.id() != id);
        if state.owned.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn health(&self) -> Result<(), CoreError> {
        self.ensure_online()
    }

    async fn customers(&self) -> Result<Vec<Customer>, CoreError> {
        self.ensure_online()?;
        Ok(vec![
            Customer {
                id: "cus_001".into(),
                name: "Acme Telecom".into(),
                email: Some("ops@acme.example".into()),
            },
            Customer {
                id: "cus_002".into(),
                name: "Globex Support".into(),
                email: None,
            },
        ])
    }

    fn describe(&self) -> String {
        "in-memory demo backend".into()
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────

/// Ten demo listings: five in San Francisco, five elsewhere.
///
/// Built through the normalizer, so the derived fields follow the same
/// rules as live data.
pub fn fixture_listings(currency: &str) -> Vec<PhoneNumber> {
    let config = NormalizerConfig {
        currency: currency.to_owned(),
    };
    let raws = [
        seed(1, "+14155551234", "US", "CA", "San Francisco", "local", 1.00, (true, true, true)),
        seed(2, "+14155555555", "US", "CA", "San Francisco", "local", 2.50, (true, true, false)),
        seed(3, "+18005551000", "US", "CA", "San Francisco", "toll-free", 5.00, (true, false, false)),
        seed(4, "+12125559876", "US", "NY", "New York", "local", 1.50, (true, true, true)),
        seed(5, "+14155552200", "US", "CA", "San Francisco", "local", 1.00, (true, true, true)),
        seed(6, "+442071234567", "GB", "England", "London", "local", 2.00, (true, true, false)),
        seed(7, "+14165558888", "CA", "ON", "Toronto", "local", 1.25, (true, true, true)),
        seed(8, "+18885551234", "US", "IL", "Chicago", "toll-free", 4.00, (true, true, false)),
        seed(9, "+14155550000", "US", "CA", "San Francisco", "local", 3.00, (true, true, true)),
        seed(10, "+61285551234", "AU", "NSW", "Sydney", "local", 2.50, (true, true, true)),
    ];
    normalize_all(&raws, |r| normalize_listing(r, &config)).items
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: i64,
    number: &str,
    country: &str,
    region: &str,
    city: &str,
    kind: &str,
    fee: f64,
    (voice, sms, mms): (bool, bool, bool),
) -> RawDid {
    RawDid {
        id: Some(Scalar::Int(id)),
        phone_number: Some(Scalar::Text(number.into())),
        country: Some(country.into()),
        province_state: Some(region.into()),
        city: Some(city.into()),
        capabilities: Some(RawCapabilities::Flags {
            voice: Some(voice),
            sms: Some(sms),
            mms: Some(mms),
        }),
        monthly_fee: Some(Scalar::Float(fee)),
        number_type: Some(kind.into()),
        ..RawDid::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::NumberType;

    fn ids(numbers: &[PhoneNumber]) -> Vec<&str> {
        numbers.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn fixtures_are_complete_and_derived() {
        let all = fixture_listings("USD");
        assert_eq!(all.len(), 10);
        assert_eq!(all[0].friendly_number, "415-555-1234");
        assert_eq!(all[3].area_code, "212");
        assert_eq!(all[5].friendly_number, "+442071234567");
        assert_eq!(all[2].number_type, NumberType::TollFree);
    }

    #[tokio::test]
    async fn search_filters_by_type_and_pattern() {
        let backend = InMemoryBackend::seeded("USD");
        let toll_free = SearchFilters {
            number_type: Some(NumberType::TollFree),
            ..SearchFilters::default()
        };
        assert_eq!(ids(&backend.search(&toll_free).await.unwrap().items), vec!["3", "8"]);

        let pattern = SearchFilters {
            pattern: Some("*0000".into()),
            ..SearchFilters::default()
        };
        assert_eq!(ids(&backend.search(&pattern).await.unwrap().items), vec!["9"]);
    }

    #[tokio::test]
    async fn purchase_unknown_id_is_not_found() {
        let backend = InMemoryBackend::seeded("USD");
        let err = backend.purchase("404").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn purchase_twice_is_rejected() {
        let backend = InMemoryBackend::seeded("USD");
        backend.purchase("1").await.unwrap();
        let err = backend.purchase("1").await.unwrap_err();
        assert!(matches!(err, CoreError::Remote { status: 409, .. }));
        assert_eq!(backend.list_owned().await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn released_numbers_return_to_search() {
        let backend = InMemoryBackend::seeded("USD");
        backend.purchase("4").await.unwrap();
        let all = SearchFilters::default();
        assert!(!ids(&backend.search(&all).await.unwrap().items).contains(&"4"));

        backend.release("4").await.unwrap();
        assert!(ids(&backend.search(&all).await.unwrap().items).contains(&"4"));
    }

    #[tokio::test]
    async fn offline_backend_fails_with_transport_error() {
        let backend = InMemoryBackend::seeded("USD");
        backend.set_online(false);
        assert!(backend.health().await.unwrap_err().is_offline());
        backend.set_online(true);
        assert!(backend.health().await.is_ok());
    }

    #[tokio::test]
    async fn reset_restores_seed_state() {
        let backend = InMemoryBackend::seeded("USD");
        backend.purchase("2").await.unwrap();
        backend.reset().await;
        assert!(backend.list_owned().await.unwrap().items.is_empty());
    }
}
