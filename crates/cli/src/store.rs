//! Flat-file store adapters.
//!
//! The record store proper is an external collaborator; these adapters only
//! deserialize its JSON exports so the CLI commands have something to read.
//! Records load once at command start - the commands are one-shot jobs, not
//! servers.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use tidewater_core::stores::{
    CatalogStore, GatewayError, OrderStore, PaymentGateway, StoreError,
};
use tidewater_core::types::{CatalogEntry, ChargeRecord, Order, Sku};

/// Error loading a flat-file export.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AdapterError> {
    let raw = fs::read_to_string(path).map_err(|source| AdapterError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| AdapterError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Catalog records from a JSON export (an array of entries).
pub struct JsonCatalog {
    entries: HashMap<Sku, CatalogEntry>,
}

impl JsonCatalog {
    /// Load from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the file is unreadable or unparseable.
    pub fn load(path: &Path) -> Result<Self, AdapterError> {
        let entries: Vec<CatalogEntry> = read_json(path)?;
        Ok(Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.sku.clone(), entry))
                .collect(),
        })
    }
}

#[async_trait]
impl CatalogStore for JsonCatalog {
    async fn entry(&self, sku: &Sku) -> Result<Option<CatalogEntry>, StoreError> {
        Ok(self.entries.get(sku).cloned())
    }
}

/// Confirmed orders from a JSON export (an array of orders).
pub struct JsonOrders {
    orders: Vec<Order>,
}

impl JsonOrders {
    /// Load from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the file is unreadable or unparseable.
    pub fn load(path: &Path) -> Result<Self, AdapterError> {
        Ok(Self {
            orders: read_json(path)?,
        })
    }
}

#[async_trait]
impl OrderStore for JsonOrders {
    async fn paid_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .iter()
            .filter(|o| o.paid && o.placed_at >= start && o.placed_at < end)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Gateway charge records from a JSON export (a map of charge id to record).
pub struct JsonCharges {
    charges: HashMap<String, ChargeRecord>,
}

impl JsonCharges {
    /// Load from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the file is unreadable or unparseable.
    pub fn load(path: &Path) -> Result<Self, AdapterError> {
        Ok(Self {
            charges: read_json(path)?,
        })
    }
}

#[async_trait]
impl PaymentGateway for JsonCharges {
    async fn charge(&self, charge_id: &str) -> Result<Option<ChargeRecord>, GatewayError> {
        Ok(self.charges.get(charge_id).copied())
    }
}
