//! # Client Components
//!
//! ## Transfer Client ([`client`])
//! Runs one submission: credentials, upload, result stream, best result.
//!
//! ## Transfer Metrics ([`metrics`])
//! Summary of a finished run, optionally exported as JSON.

pub mod client;
pub mod metrics;

// Re-export for convenience
pub use client::TransferClient;
pub use metrics::TransferMetrics;
