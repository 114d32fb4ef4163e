//! Driver registry — maps driver names to cached driver instances.
//!
//! Populated once at startup, then only read. Every registered driver is
//! wrapped in a [`CachingDriver`] so that device handles are created at most
//! once per address.

mod caching_driver;

pub use caching_driver::CachingDriver;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use roomctl_domain::error::DriverError;

use crate::ports::Driver;

/// Errors raised while populating or configuring the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("driver name must not be empty")]
    EmptyName,

    #[error("driver {0:?} is already registered")]
    Duplicate(String),

    #[error("driver {0:?} is not registered")]
    Unknown(String),

    #[error("invalid configuration for driver {name:?}")]
    Config {
        name: String,
        #[source]
        source: DriverError,
    },
}

/// Name → driver map shared by the engine and the HTTP layer.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: RwLock<HashMap<String, Arc<CachingDriver>>>,
}

impl DriverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `driver` under `name`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EmptyName`] for an empty name,
    /// [`RegistryError::Duplicate`] when the name is already taken.
    #[tracing::instrument(skip(self, driver), fields(name = %name.as_ref()))]
    pub fn register<D>(&self, name: impl AsRef<str>, driver: D) -> Result<(), RegistryError>
    where
        D: Driver + 'static,
    {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let mut drivers = self
            .drivers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if drivers.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        drivers.insert(name.to_string(), Arc::new(CachingDriver::new(driver)));
        tracing::debug!("driver registered");
        Ok(())
    }

    /// Look up a driver. Unknown names yield `None`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<CachingDriver>> {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names of every registered driver, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Forward driver-wide configuration to a registered driver.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Unknown`] if no such driver is registered,
    /// [`RegistryError::Config`] if the driver rejects the configuration.
    pub fn configure(&self, name: &str, config: &serde_json::Value) -> Result<(), RegistryError> {
        let driver = self
            .get(name)
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))?;
        driver
            .parse_config(config)
            .map_err(|source| RegistryError::Config {
                name: name.to_string(),
                source,
            })
    }
}
