pub mod client;
pub mod common;

pub use client::{TransferClient, TransferMetrics};
pub use common::config::ClientConfig;
pub use common::messages::Credentials;
