//! Virtual device implementations — display, switcher, DSP.
//!
//! Every device keeps its state in memory behind a mutex and pays the
//! configured latency on each call, bounded by the request context.

mod display;
mod dsp;
mod switcher;

pub use display::VirtualDisplay;
pub use dsp::VirtualDsp;
pub use switcher::VirtualSwitcher;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use roomctl_app::context::RequestContext;
use roomctl_domain::error::DriverError;

/// Simulated connection to one device.
#[derive(Debug, Clone)]
pub struct Link {
    address: String,
    latency: Duration,
}

impl Link {
    pub fn new(address: impl Into<String>, latency: Duration) -> Self {
        Self {
            address: address.into(),
            latency,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Wait for one simulated round trip.
    ///
    /// # Errors
    ///
    /// Returns the context error when the request ends first.
    pub async fn round_trip(&self, ctx: &RequestContext) -> Result<(), DriverError> {
        if self.latency.is_zero() {
            return ctx.err().map_or(Ok(()), |err| Err(err.into()));
        }
        ctx.run(tokio::time::sleep(self.latency)).await?;
        Ok(())
    }
}

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reject levels outside the `0..=100` scale every virtual device uses.
fn check_level(level: i32) -> Result<(), DriverError> {
    if (0..=100).contains(&level) {
        Ok(())
    } else {
        Err(DriverError::msg(format!("volume {level} out of range 0-100")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_fail_round_trip_when_context_cancelled() {
        let link = Link::new("10.0.0.1", Duration::ZERO);
        let ctx = RequestContext::background();
        ctx.cancel();

        let err = link.round_trip(&ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "context canceled");
    }

    #[tokio::test]
    async fn should_stop_waiting_when_deadline_passes() {
        let link = Link::new("10.0.0.1", Duration::from_secs(30));
        let ctx = RequestContext::with_timeout(Duration::from_millis(10));

        let err = link.round_trip(&ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "context deadline exceeded");
    }

    #[test]
    fn should_reject_level_out_of_range() {
        assert!(check_level(0).is_ok());
        assert!(check_level(100).is_ok());
        assert_eq!(
            check_level(101).unwrap_err().to_string(),
            "volume 101 out of range 0-100"
        );
    }
}
