//! Per-device result accumulator shared by a device task's field sub-tasks.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use roomctl_domain::error::{DriverError, FieldError};
use roomctl_domain::id::DeviceId;
use roomctl_domain::response::DeviceStateError;
use roomctl_domain::state::DeviceState;

use super::fan_out::Outcome;
use crate::context::RequestContext;

/// Partial state and errors for one device, written by concurrent sub-tasks.
pub(crate) struct Accumulator {
    id: DeviceId,
    inner: Mutex<Partial>,
}

#[derive(Default)]
struct Partial {
    state: DeviceState,
    errors: Vec<DeviceStateError>,
}

impl Accumulator {
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            inner: Mutex::new(Partial::default()),
        }
    }

    /// Apply one successful field to the partial state.
    pub fn record(&self, apply: impl FnOnce(&mut DeviceState)) {
        let mut partial = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut partial.state);
    }

    /// Record a failed field, with the value that was being applied.
    pub fn fail(&self, field: impl Into<String>, value: Option<serde_json::Value>, err: FieldError) {
        let field = field.into();
        tracing::debug!(device = %self.id, %field, error = %err, "field failed");
        let error = DeviceStateError::new(self.id.clone(), field, value, err);
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .errors
            .push(error);
    }

    /// The device's report: its state when any field succeeded, and every error.
    pub fn finish(self) -> Outcome<DeviceState> {
        let Partial { state, errors } = self.inner.into_inner().unwrap_or_else(PoisonError::into_inner);
        Outcome {
            data: (!state.is_empty()).then_some(state),
            errors,
        }
    }
}

/// Run one driver call under the request context.
pub(crate) async fn call<T, F>(ctx: &RequestContext, fut: F) -> Result<T, FieldError>
where
    F: Future<Output = Result<T, DriverError>>,
{
    Ok(ctx.run(fut).await??)
}

/// Like [`call`], for calls that already report a [`FieldError`].
pub(crate) async fn call_field<T, F>(ctx: &RequestContext, fut: F) -> Result<T, FieldError>
where
    F: Future<Output = Result<T, FieldError>>,
{
    ctx.run(fut).await?
}
