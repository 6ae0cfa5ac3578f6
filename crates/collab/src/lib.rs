//! Collaborative editing through a central authority.
//!
//! Sessions edit optimistically and send their changes to an authority,
//! which assigns each accepted update the next version and broadcasts it to
//! every session. This crate holds one session's side of that protocol:
//! * [`Collab`]: the session handle (queue local edits, integrate batches)
//! * [`Update`] / [`LocalUpdate`]: what is exchanged with the authority
//! * [`Transaction`]: what is exchanged with the host document
//! * [`SharedEffect`]: side-channel payloads that follow concurrent edits
//!
//! Transport and the authority itself live outside this crate. The only
//! requirement on them is that batches arrive in version order without gaps.

#![warn(missing_docs)]

mod client_id;
pub mod config;
pub mod effect;
pub mod error;
mod rebase;
mod session;
mod state;
pub mod update;

pub use client_id::ClientId;
pub use config::CollabConfig;
pub use effect::{CursorEffect, NoEffect, SharedEffect};
pub use error::{CollabError, DesyncReason, Result};
pub use session::Collab;
pub use state::CollabState;
pub use update::{EditSource, LocalUpdate, Transaction, Update};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use tracing_subscriber as _;
