//! Values exchanged with the host document and with the authority.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tandem_primitives::ChangeSet;

use crate::ClientId;
use crate::effect::NoEffect;

/// A set of changes and effects produced by one session.
///
/// The unit exchanged with the authority. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update<E = NoEffect> {
	changes: ChangeSet,
	#[serde(default = "Vec::new")]
	effects: Vec<E>,
	client_id: ClientId,
}

impl<E> Update<E> {
	/// Creates an update produced by `client_id`.
	pub fn new(changes: ChangeSet, effects: Vec<E>, client_id: ClientId) -> Self {
		Self {
			changes,
			effects,
			client_id,
		}
	}

	/// The document changes made by this update.
	pub fn changes(&self) -> &ChangeSet {
		&self.changes
	}

	/// Effects shared alongside the changes.
	pub fn effects(&self) -> &[E] {
		&self.effects
	}

	/// The session that produced this update.
	pub fn client_id(&self) -> &ClientId {
		&self.client_id
	}
}

/// An update produced by this session and not yet confirmed by the authority.
///
/// Carries the [`Transaction`] that created it so callers can send along
/// metadata. The update itself may have been rebased since; the origin is
/// always the transaction as the host originally produced it.
#[derive(Debug, Clone)]
pub struct LocalUpdate<E = NoEffect> {
	update: Update<E>,
	origin: Arc<Transaction<E>>,
}

impl<E> LocalUpdate<E> {
	pub(crate) fn new(update: Update<E>, origin: Arc<Transaction<E>>) -> Self {
		Self { update, origin }
	}

	/// Replaces the update while keeping the origin.
	pub(crate) fn rebased(&self, update: Update<E>) -> Self {
		Self {
			update,
			origin: Arc::clone(&self.origin),
		}
	}

	/// The update as it should currently be sent.
	pub fn update(&self) -> &Update<E> {
		&self.update
	}

	/// The transaction that produced this update.
	pub fn origin(&self) -> &Transaction<E> {
		&self.origin
	}

	/// Shorthand for `self.update().changes()`.
	pub fn changes(&self) -> &ChangeSet {
		self.update.changes()
	}

	/// Shorthand for `self.update().effects()`.
	pub fn effects(&self) -> &[E] {
		self.update.effects()
	}
}

/// Where a transaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditSource {
	/// Produced by the local user or host.
	Local,
	/// Produced by integrating an authority batch.
	Remote,
}

/// An immutable description of one document edit, exchanged with the host.
///
/// The host emits a local transaction per edit; the session hands back remote
/// transactions when authority batches are integrated.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction<E = NoEffect> {
	changes: ChangeSet,
	effects: Vec<E>,
	source: EditSource,
	label: Option<String>,
}

impl<E> Transaction<E> {
	/// Creates a locally produced transaction.
	pub fn local(changes: ChangeSet) -> Self {
		Self {
			changes,
			effects: Vec::new(),
			source: EditSource::Local,
			label: None,
		}
	}

	/// Creates a transaction integrating remote changes and effects.
	pub fn remote(changes: ChangeSet, effects: Vec<E>) -> Self {
		Self {
			changes,
			effects,
			source: EditSource::Remote,
			label: None,
		}
	}

	/// Attaches effects.
	pub fn with_effects(mut self, effects: Vec<E>) -> Self {
		self.effects = effects;
		self
	}

	/// Attaches a caller-defined label (user event name, timestamp, ...).
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// The document changes.
	pub fn changes(&self) -> &ChangeSet {
		&self.changes
	}

	/// Effects carried by this transaction.
	pub fn effects(&self) -> &[E] {
		&self.effects
	}

	/// Where this transaction came from.
	pub fn source(&self) -> EditSource {
		self.source
	}

	/// Returns true if this transaction integrates an authority batch.
	pub fn is_remote(&self) -> bool {
		self.source == EditSource::Remote
	}

	/// Caller-defined label, if any.
	pub fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use tandem_primitives::Range;

	use super::*;
	use crate::CursorEffect;

	#[test]
	fn test_update_wire_shape() {
		let update: Update = Update::new(ChangeSet::insert_text(0, 0, "a").unwrap(), Vec::new(), "alice".into());
		let json = serde_json::to_string(&update).unwrap();
		assert_eq!(json, r#"{"changes":[{"insert":"a"}],"effects":[],"client_id":"alice"}"#);
	}

	#[test]
	fn test_update_effects_default_to_empty() {
		let update: Update<CursorEffect> =
			serde_json::from_str(r#"{"changes":[{"retain":3}],"client_id":"bob"}"#).unwrap();
		assert!(update.effects().is_empty());
		assert_eq!(update.changes().len(), 3);
		assert_eq!(update.client_id().as_str(), "bob");
	}

	#[test]
	fn test_update_decodes_cursor_effects() {
		let json = r#"{"changes":[{"retain":3}],"effects":[{"client_id":"bob","range":{"anchor":1,"head":2}}],"client_id":"bob"}"#;
		let update: Update<CursorEffect> = serde_json::from_str(json).unwrap();
		assert_eq!(update.effects(), &[CursorEffect {
			client_id: "bob".into(),
			range: Range::new(1, 2),
		}]);
	}

	#[test]
	fn test_transaction_builders() {
		let tr: Transaction = Transaction::local(ChangeSet::empty(2)).with_label("input.type");
		assert_eq!(tr.source(), EditSource::Local);
		assert_eq!(tr.label(), Some("input.type"));
		assert!(!tr.is_remote());
	}
}
