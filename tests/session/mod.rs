//! Session tests
//!
//! Tests for:
//! - Root resolution and deferred buffer replay
//! - Model rebuilds and configuration rebinding
//! - Capability requests (parking, snapshots, cancellation, failures)
//! - Diagnostics publishing and stale diagnostic erasure
mod tests_diagnostics;
mod tests_lifecycle;
mod tests_requests;
