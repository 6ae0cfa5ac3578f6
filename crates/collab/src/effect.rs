//! Side-channel payloads synchronized alongside document changes.

use std::fmt;

use serde::{Deserialize, Serialize};
use tandem_primitives::{ChangeSet, Range};

use crate::ClientId;

/// A payload shared between sessions next to a change set.
///
/// Effects that refer to document positions must follow concurrent edits, so
/// each payload type decides how it maps through a change set: adjust its
/// positions, pass through unchanged, or drop out by returning `None`.
pub trait SharedEffect: Clone + fmt::Debug {
	/// Maps this effect through `changes`.
	fn map(&self, changes: &ChangeSet) -> Option<Self>;
}

/// Maps every effect through `changes`, dropping the ones that opt out.
pub(crate) fn map_effects<E: SharedEffect>(effects: &[E], changes: &ChangeSet) -> Vec<E> {
	effects.iter().filter_map(|effect| effect.map(changes)).collect()
}

/// Effect type for sessions that only share document changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoEffect {}

impl SharedEffect for NoEffect {
	fn map(&self, _changes: &ChangeSet) -> Option<Self> {
		match *self {}
	}
}

/// A session's cursor or selection, broadcast as presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorEffect {
	/// Session the cursor belongs to.
	pub client_id: ClientId,
	/// Cursor or selection extent.
	pub range: Range,
}

impl SharedEffect for CursorEffect {
	fn map(&self, changes: &ChangeSet) -> Option<Self> {
		Some(Self {
			client_id: self.client_id.clone(),
			range: self.range.map_through(changes),
		})
	}
}
