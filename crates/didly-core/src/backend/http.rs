// ── HTTP backend ──
//
// Adapts `didly_api::DidClient` to `DidBackend`: domain filters become
// query parameters, raw responses go through the normalizer.

use async_trait::async_trait;
use tracing::debug;

use didly_api::DidClient;
use didly_api::types::{ProvisionRequest, SearchQuery};

use super::DidBackend;
use crate::command::ConfigUpdate;
use crate::config::ProvisioningDefaults;
use crate::error::CoreError;
use crate::model::{Customer, OwnedPhoneNumber, PhoneNumber, SearchFilters};
use crate::normalize::{
    Normalized, NormalizerConfig, decode_record, normalize_all, normalize_customer,
    normalize_listing, normalize_owned,
};

pub struct HttpBackend {
    client: DidClient,
    normalizer: NormalizerConfig,
    provisioning: ProvisioningDefaults,
}

impl HttpBackend {
    pub fn new(
        client: DidClient,
        normalizer: NormalizerConfig,
        provisioning: ProvisioningDefaults,
    ) -> Self {
        Self {
            client,
            normalizer,
            provisioning,
        }
    }
}

fn to_query(filters: &SearchFilters) -> SearchQuery {
    SearchQuery {
        area_code: filters.area_code.clone(),
        city: filters.city.clone(),
        pattern: filters.pattern.clone(),
        number_type: filters.number_type.map(|t| t.to_string()),
        country: filters.country.clone(),
    }
}

#[async_trait]
impl DidBackend for HttpBackend {
    async fn search(&self, filters: &SearchFilters) -> Result<Normalized<PhoneNumber>, CoreError> {
        let raws = self.client.search(&to_query(filters)).await?;
        debug!(count = raws.len(), "search returned");
        Ok(normalize_all(&raws, |r| {
            decode_record(r).and_then(|raw| normalize_listing(&raw, &self.normalizer))
        }))
    }

    async fn purchase(&self, id: &str) -> Result<OwnedPhoneNumber, CoreError> {
        let request = ProvisionRequest {
            did_id: id.to_owned(),
            routing: self.provisioning.routing.clone(),
            description: self.provisioning.description.clone(),
        };
        let raw = self.client.provision(&request).await?;
        Ok(normalize_owned(&raw, &self.normalizer)?)
    }

    async fn list_owned(&self) -> Result<Normalized<OwnedPhoneNumber>, CoreError> {
        let raws = self.client.list_dids().await?;
        Ok(normalize_all(&raws, |r| {
            decode_record(r).and_then(|raw| normalize_owned(&raw, &self.normalizer))
        }))
    }

    async fn update_config(
        &self,
        id: &str,
        update: &ConfigUpdate,
    ) -> Result<OwnedPhoneNumber, CoreError> {
        let raw = self.client.update_did(id, &update.to_request()).await?;
        Ok(normalize_owned(&raw, &self.normalizer)?)
    }

    async fn release(&self, id: &str) -> Result<(), CoreError> {
        Ok(self.client.release_did(id).await?)
    }

    async fn health(&self) -> Result<(), CoreError> {
        let report = self.client.health().await?;
        debug!(status = ?report.status, version = ?report.version, "health ok");
        Ok(())
    }

    async fn customers(&self) -> Result<Vec<Customer>, CoreError> {
        let raws = self.client.list_customers().await?;
        Ok(normalize_all(&raws, |r| {
            decode_record(r).and_then(|raw| normalize_customer(&raw))
        })
        .items)
    }

    fn describe(&self) -> String {
        self.client.base_url().to_string()
    }
}
