//! Timeout helpers for collaborator calls
//!
//! Every geocoder, forecast and seasonal-estimator call is bounded so a
//! hung provider degrades one destination instead of stalling the batch.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let coords = with_timeout(
//!     Duration::from_secs(10),
//!     geocoder.resolve("Shimla"),
//!     "geocode Shimla",
//! ).await?;
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

use crate::types::{GuardError, Result};

/// Execute an async operation with a timeout
///
/// Returns `GuardError::Timeout` if the operation doesn't complete within
/// `timeout`; otherwise the operation's own result.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(GuardError::timeout(operation_name, timeout)),
    }
}

/// Cooperative deadline for synchronous, CPU-bound work
///
/// The sandboxed parser cannot be preempted, so it polls this every few
/// hundred tokens instead.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
        }
    }

    /// A deadline that never expires
    pub fn none() -> Self {
        Self { at: None }
    }

    pub fn expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }
}
