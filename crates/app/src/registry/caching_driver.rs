//! Caching decorator — single-flight device creation, memoized per address.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};

use roomctl_domain::error::DriverError;

use crate::context::RequestContext;
use crate::ports::{DeviceHandle, Driver};

type Creation = Shared<BoxFuture<'static, Result<DeviceHandle, DriverError>>>;

/// Wraps a [`Driver`] so each address is opened at most once at a time.
///
/// Concurrent callers asking for the same uncached address share one
/// underlying `create_device` call and all receive its result. Successful
/// handles are kept for the life of the process; failures are not kept, so
/// the next caller starts a fresh attempt. A panicking driver counts as a
/// failure.
///
/// The shared attempt runs under the context of the caller that started it,
/// so callers joining it later receive that caller's deadline error if it
/// expires first.
pub struct CachingDriver {
    inner: Arc<Inner>,
}

struct Inner {
    driver: Box<dyn Driver>,
    devices: RwLock<HashMap<String, DeviceHandle>>,
    in_flight: Mutex<HashMap<String, Creation>>,
}

impl CachingDriver {
    pub fn new<D>(driver: D) -> Self
    where
        D: Driver + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                driver: Box::new(driver),
                devices: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Number of memoized handles.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.inner
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lookup(&self, address: &str) -> Option<DeviceHandle> {
        self.inner
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
    }

    fn start(&self, ctx: &RequestContext, address: &str) -> Creation {
        let inner = Arc::clone(&self.inner);
        let ctx = ctx.clone();
        let address = address.to_string();

        async move {
            let result = AssertUnwindSafe(inner.driver.create_device(&ctx, &address))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(DriverError::msg("device creation panicked")));
            match &result {
                Ok(handle) => {
                    inner
                        .devices
                        .write()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(address.clone(), handle.clone());
                    tracing::debug!(%address, capabilities = ?handle.capabilities(), "device created");
                }
                Err(err) => tracing::warn!(%address, error = %err, "device creation failed"),
            }
            // The cache is filled before the in-flight entry goes away, so a
            // caller never misses both.
            inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&address);
            result
        }
        .boxed()
        .shared()
    }
}

#[async_trait]
impl Driver for CachingDriver {
    async fn create_device(
        &self,
        ctx: &RequestContext,
        address: &str,
    ) -> Result<DeviceHandle, DriverError> {
        if let Some(handle) = self.lookup(address) {
            return Ok(handle);
        }

        let creation = {
            let mut in_flight = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(handle) = self.lookup(address) {
                return Ok(handle);
            }
            in_flight
                .entry(address.to_string())
                .or_insert_with(|| self.start(ctx, address))
                .clone()
        };

        creation.await
    }

    fn parse_config(&self, config: &serde_json::Value) -> Result<(), DriverError> {
        self.inner.driver.parse_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::testing::MockDriver;

    #[tokio::test]
    async fn should_memoize_handle_per_address() {
        let mock = MockDriver::default();
        let calls = mock.creations();
        let driver = CachingDriver::new(mock);
        let ctx = RequestContext::background();

        driver.create_device(&ctx, "10.0.0.1").await.unwrap();
        driver.create_device(&ctx, "10.0.0.1").await.unwrap();
        driver.create_device(&ctx, "10.0.0.2").await.unwrap();

        assert_eq!(calls.count("10.0.0.1"), 1);
        assert_eq!(calls.count("10.0.0.2"), 1);
        assert_eq!(driver.cached(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn should_create_once_when_called_concurrently() {
        let mock = MockDriver::default().with_delay(Duration::from_millis(50));
        let calls = mock.creations();
        let driver = Arc::new(CachingDriver::new(mock));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let driver = Arc::clone(&driver);
            tasks.push(tokio::spawn(async move {
                driver
                    .create_device(&RequestContext::background(), "10.0.0.1")
                    .await
            }));
        }

        let mut devices = Vec::new();
        for task in tasks {
            let handle = task.await.unwrap().unwrap();
            devices.push(handle);
        }

        assert_eq!(calls.count("10.0.0.1"), 1);
        assert_eq!(devices.len(), 16);
        assert_eq!(driver.cached(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn should_share_error_between_concurrent_callers() {
        let mock = MockDriver::default()
            .with_delay(Duration::from_millis(50))
            .failing("10.0.0.9");
        let calls = mock.creations();
        let driver = Arc::new(CachingDriver::new(mock));

        let a = {
            let driver = Arc::clone(&driver);
            tokio::spawn(async move {
                driver
                    .create_device(&RequestContext::background(), "10.0.0.9")
                    .await
            })
        };
        let b = {
            let driver = Arc::clone(&driver);
            tokio::spawn(async move {
                driver
                    .create_device(&RequestContext::background(), "10.0.0.9")
                    .await
            })
        };

        let a = a.await.unwrap().unwrap_err();
        let b = b.await.unwrap().unwrap_err();
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(calls.count("10.0.0.9"), 1);
    }

    #[tokio::test]
    async fn should_retry_after_failure() {
        let mock = MockDriver::default().failing("10.0.0.9");
        let calls = mock.creations();
        let driver = CachingDriver::new(mock);
        let ctx = RequestContext::background();

        assert!(driver.create_device(&ctx, "10.0.0.9").await.is_err());
        assert!(driver.create_device(&ctx, "10.0.0.9").await.is_err());

        assert_eq!(calls.count("10.0.0.9"), 2);
        assert_eq!(driver.cached(), 0);
    }

    #[tokio::test]
    async fn should_retry_after_driver_panicked() {
        let mock = MockDriver::default().panicking_once("10.0.0.7");
        let calls = mock.creations();
        let driver = CachingDriver::new(mock);
        let ctx = RequestContext::background();

        let err = driver.create_device(&ctx, "10.0.0.7").await.unwrap_err();
        assert_eq!(err.to_string(), "device creation panicked");

        assert!(driver.create_device(&ctx, "10.0.0.7").await.is_ok());
        assert_eq!(calls.count("10.0.0.7"), 2);
        assert_eq!(driver.cached(), 1);
    }
}
