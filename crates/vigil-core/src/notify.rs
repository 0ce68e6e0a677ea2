//! The `Notifier` trait — best-effort outbound delivery of change batches.
//!
//! The tracker calls [`Notifier::notify_batch`] once per check run that found
//! changes, logs the outcome, and never lets it affect control flow. Delivery
//! is fire-and-forget by contract.

use std::future::Future;

use thiserror::Error;

use crate::app::VersionChange;

#[derive(Debug, Error)]
pub enum NotifyError {
  #[error("notification transport error: {0}")]
  Transport(String),

  #[error("notification endpoint returned status {0}")]
  Status(u16),
}

/// Outbound delivery of human-readable change summaries.
pub trait Notifier: Send + Sync {
  /// Deliver a summary of one check run's detected changes.
  ///
  /// Implementations for disabled or unconfigured channels should return
  /// `Ok(())` without doing anything.
  fn notify_batch<'a>(
    &'a self,
    changes: &'a [VersionChange],
  ) -> impl Future<Output = Result<(), NotifyError>> + Send + 'a;
}
