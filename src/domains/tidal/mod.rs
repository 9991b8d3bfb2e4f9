//! TIDAL domain module.
//!
//! Everything that talks to the streaming service lives here:
//!
//! - `client.rs` - the [`StreamingClient`] seam and its REST implementation
//! - `session.rs` - the shared [`SessionManager`] (session file + OAuth login)
//! - `models.rs` - wire types and the persisted session record
//! - `browser.rs` - system browser launcher for the login flow
//! - `error.rs` - [`TidalError`]

mod browser;
mod client;
mod error;
pub mod models;
mod session;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
mod stub;

pub use client::{StreamingClient, TidalClient};
pub use error::TidalError;
pub use session::{LoginOutcome, SessionManager, normalize_verification_url};
