//! The per-session collaboration handle.
//!
//! [`Collab`] is owned by whatever owns the host document's state
//! transitions. Every method takes `&mut self` or `&self`, so local edits and
//! batch integration are serialized with each other by construction.
//!
//! ```text
//! host edit ──observe()──▶ unconfirmed queue ──sendable()──▶ transport ──▶ authority
//!                                                                             │
//! host doc ◀──Transaction── receive() ◀───── ordered, contiguous batches ─────┘
//! ```

use std::sync::Arc;

use tandem_primitives::ChangeSet;
use tracing::{debug, trace, warn};

use crate::config::{CollabConfig, SharedEffectsFn};
use crate::effect::{NoEffect, SharedEffect};
use crate::error::{DesyncReason, Result};
use crate::rebase::{Rebased, rebase};
use crate::state::CollabState;
use crate::update::{LocalUpdate, Transaction, Update};
use crate::ClientId;


/// Collaborative editing state for one session.
pub struct Collab<E = NoEffect> {
	client_id: ClientId,
	shared_effects: Option<SharedEffectsFn<E>>,
	state: CollabState<E>,
}

impl<E: SharedEffect> Collab<E> {
	/// Starts a session from `config`.
	pub fn new(config: CollabConfig<E>) -> Self {
		let client_id = config.client_id.unwrap_or_else(ClientId::random);
		debug!(client = %client_id, version = config.start_version, "collab session started");
		Self {
			client_id,
			shared_effects: config.shared_effects,
			state: CollabState::new(config.start_version),
		}
	}

	/// This session's identifier.
	pub fn client_id(&self) -> &ClientId {
		&self.client_id
	}

	/// The version up to which this session has synced with the authority.
	///
	/// Transports request "updates since" this version on reconnect.
	pub fn synced_version(&self) -> u64 {
		self.state.version()
	}

	/// The full synchronization state.
	pub fn state(&self) -> &CollabState<E> {
		&self.state
	}

	/// Unconfirmed updates together with the transactions that produced them.
	///
	/// The updates may have been rebased since; origins never change.
	pub fn unconfirmed(&self) -> &[LocalUpdate<E>] {
		self.state.unconfirmed()
	}

	/// Local updates that still have to be sent to the authority, oldest first.
	pub fn sendable(&self) -> impl ExactSizeIterator<Item = &Update<E>> + '_ {
		self.state.unconfirmed().iter().map(LocalUpdate::update)
	}

	/// Queues a local update.
	pub fn append_local(&mut self, changes: ChangeSet, effects: Vec<E>, origin: Arc<Transaction<E>>) {
		let update = Update::new(changes, effects, self.client_id.clone());
		self.state.push(LocalUpdate::new(update, origin));
		trace!(
			client = %self.client_id,
			pending = self.state.unconfirmed().len(),
			"local update queued"
		);
	}

	/// Records a transaction the host applied to its document.
	///
	/// Remote transactions (the ones returned by [`Self::receive`]) are
	/// ignored. A local transaction is queued when it changes the document
	/// or yields effects from the configured shared-effects function.
	/// Returns whether it was queued.
	pub fn observe(&mut self, tr: impl Into<Arc<Transaction<E>>>) -> bool {
		let tr = tr.into();
		if tr.is_remote() {
			return false;
		}

		let effects = self.shared_effects.as_ref().map(|f| f(tr.as_ref())).unwrap_or_default();
		if tr.changes().is_identity() && effects.is_empty() {
			return false;
		}

		let changes = tr.changes().clone();
		self.append_local(changes, effects, tr);
		true
	}

	/// Integrates the batches confirmed at versions
	/// `synced_version() + 1 ..= synced_version() + updates.len()`.
	///
	/// Returns the transaction the host must apply to its document, or
	/// `None` when the batches only confirmed this session's own updates.
	///
	/// # Errors
	/// [`CollabError::ProtocolDesync`](crate::CollabError::ProtocolDesync) if
	/// an echo does not match the unconfirmed queue, and
	/// [`CollabError::Change`](crate::CollabError::Change) for malformed
	/// change sets. Nothing is integrated on error.
	pub fn receive(&mut self, updates: &[Update<E>]) -> Result<Option<Transaction<E>>> {
		let Rebased { state, edit } = rebase(&self.state, &self.client_id, updates).inspect_err(|err| {
			warn!(
				client = %self.client_id,
				version = self.state.version(),
				batch = updates.len(),
				error = %err,
				"failed to integrate authority batch"
			);
		})?;

		self.state = state;
		Ok(edit)
	}

	/// Like [`Self::receive`], for a batch whose first update was confirmed
	/// at `first_version`.
	///
	/// # Errors
	/// A batch that does not start right after the synced version is
	/// rejected as a [`DesyncReason::VersionGap`]. Batches are never
	/// reordered or deduplicated.
	pub fn receive_at(&mut self, first_version: u64, updates: &[Update<E>]) -> Result<Option<Transaction<E>>> {
		if updates.is_empty() {
			return Ok(None);
		}

		let expected = self.state.version() + 1;
		if first_version != expected {
			warn!(client = %self.client_id, expected, received = first_version, "authority batch out of order");
			return Err(DesyncReason::VersionGap {
				expected,
				received: first_version,
			}
			.into());
		}

		self.receive(updates)
	}

	/// Discards all local state and restarts from `version`.
	///
	/// Used after a [`ProtocolDesync`](crate::CollabError::ProtocolDesync),
	/// once the host has reloaded the authority's snapshot at `version`.
	pub fn reset(&mut self, version: u64) {
		debug!(
			client = %self.client_id,
			version,
			dropped = self.state.unconfirmed().len(),
			"collab session reset"
		);
		self.state = CollabState::new(version);
	}
}

impl<E: SharedEffect> Default for Collab<E> {
	fn default() -> Self {
		Self::new(CollabConfig::default())
	}
}

impl<E: std::fmt::Debug> std::fmt::Debug for Collab<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Collab")
			.field("client_id", &self.client_id)
			.field("state", &self.state)
			.finish_non_exhaustive()
	}
}
