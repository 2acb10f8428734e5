//! Relay for generative-AI prediction jobs.
//!
//! A request is turned into a [`JobSpec`](prediction::JobSpec), submitted to
//! the provider (negotiating the request shape when needed), polled at a
//! fixed interval until it finishes or the deadline passes, and normalized
//! into a [`ResultEnvelope`](envelope::ResultEnvelope). Background removal of
//! inline images can also carry a brand description from a second provider.

pub mod api;
pub mod config;
pub mod description;
pub mod envelope;
pub mod error;
pub mod modes;
pub mod prediction;
pub mod provider;
pub mod relay;

pub use config::RelayConfig;
pub use envelope::ResultEnvelope;
pub use error::RelayError;
pub use relay::{Relay, RelaySettings};
