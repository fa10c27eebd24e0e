use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use crate::config::LedgerSettings;
use crate::engine::Engine;
use crate::limits::*;

/// One engine per restaurant. Restaurant = database name from the pgwire
/// connection; ledgers are created on first use and live for the process.
pub struct TenantManager {
    engines: DashMap<String, Arc<Engine>>,
    settings: LedgerSettings,
}

impl TenantManager {
    pub fn new(settings: LedgerSettings) -> Self {
        Self {
            engines: DashMap::new(),
            settings,
        }
    }

    /// Get or lazily create the engine for the given restaurant.
    pub fn get_or_create(&self, tenant: &str) -> std::io::Result<Arc<Engine>> {
        if let Some(engine) = self.engines.get(tenant) {
            return Ok(engine.value().clone());
        }
        if tenant.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty tenant name",
            ));
        }
        if tenant.len() > MAX_TENANT_NAME_LEN {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "tenant name too long",
            ));
        }
        if self.engines.len() >= MAX_TENANTS {
            return Err(std::io::Error::other("too many tenants"));
        }

        let engine = match self.engines.entry(tenant.to_string()) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(e) => {
                let engine = Arc::new(Engine::new(
                    self.settings.new_ledger(),
                    self.settings.hours,
                ));
                e.insert(engine.clone());
                info!(
                    "opened ledger for {tenant:?} with {} tables",
                    self.settings.tables
                );
                engine
            }
        };
        metrics::gauge!(crate::observability::TENANTS_ACTIVE).set(self.engines.len() as f64);
        Ok(engine)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
