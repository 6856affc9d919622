//! # Common Components
//!
//! Wire-level building blocks used by the submission client.
//!
//! ## Modules
//!
//! - [`messages`]: Fixed-layout credential, header and trailer records
//! - [`connection`]: Stream wrapper performing each step of the exchange
//! - [`config`]: Configuration structures and TOML loading
//! - [`error`]: Typed transfer failures

pub mod config;
pub mod connection;
pub mod error;
pub mod messages;
