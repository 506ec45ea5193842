//! Shared ambient plumbing for the VCU radio-dispatch endpoint pair:
//! configuration loading, tracing setup, and per-endpoint RNG.

pub mod config;
pub mod error;
pub mod logging;
pub mod rng;

pub use config::EndpointConfig;
pub use error::{Error, Result};
pub use rng::EndpointRng;
