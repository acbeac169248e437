//! Key-authority client for nanoshutter.
//!
//! Provides time-lock encryption against a remote key authority:
//! - Epoch directory with single-flight eon-key initialization
//! - HTTP key fetcher for epoch public and secret keys
//! - Encrypt/decrypt orchestration producing [`SealedEnvelope`]s
//!
//! ```no_run
//! # async fn demo() -> nanoshutter_client::ClientResult<()> {
//! use nanoshutter_client::{ClientConfig, TimelockClient};
//!
//! let client = TimelockClient::new(ClientConfig::for_authority("http://localhost:5000"))?;
//! let envelope = client.encrypt_str("sealed bid: 42").await?;
//! let wire = envelope.to_json().map_err(nanoshutter_client::ClientError::from)?;
//! // ... later, once the epoch has elapsed
//! let message = client.decrypt_to_string(&envelope).await?;
//! # let _ = (wire, message);
//! # Ok(())
//! # }
//! ```

pub mod api_client;
pub mod client;
pub mod clock;
pub mod config;
pub mod directory;
pub mod error;
pub mod types;

pub use api_client::{HttpKeyAuthority, KeyAuthority};
pub use client::TimelockClient;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ClientConfig;
pub use directory::EpochDirectory;
pub use error::{ClientError, ClientResult};
pub use nanoshutter_crypto::SealedEnvelope;
pub use types::*;
