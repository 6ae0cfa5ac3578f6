use serde::{Deserialize, Serialize};

use crate::changes::{Bias, ChangeSet};

/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical coordinate space for every change set.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// Range direction (anchor to head).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	/// Head is at or after anchor.
	Forward,
	/// Head is before anchor.
	Backward,
}

/// A text range defined by anchor and head positions.
///
/// The anchor is the fixed end, and the head is the cursor. Used for cursor
/// and selection presence shared between sessions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
	/// The fixed end of the range.
	pub anchor: CharIdx,
	/// The moving end of the range (cursor position).
	pub head: CharIdx,
}

impl Range {
	/// Creates a new range from anchor to head.
	pub fn new(anchor: CharIdx, head: CharIdx) -> Self {
		Self { anchor, head }
	}

	/// Creates a zero-width range (cursor) at the given position.
	pub fn point(pos: CharIdx) -> Self {
		Self::new(pos, pos)
	}

	/// Returns the smaller of anchor and head.
	#[inline]
	pub fn min(&self) -> CharIdx {
		std::cmp::min(self.anchor, self.head)
	}

	/// Returns the larger of anchor and head.
	#[inline]
	pub fn max(&self) -> CharIdx {
		std::cmp::max(self.anchor, self.head)
	}

	/// Returns true if anchor equals head (zero-width cursor).
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.anchor == self.head
	}

	/// Returns the direction of this range.
	#[inline]
	pub fn direction(&self) -> Direction {
		if self.head < self.anchor {
			Direction::Backward
		} else {
			Direction::Forward
		}
	}

	/// Maps this range through a change set.
	///
	/// A cursor follows text inserted exactly at its position. A non-empty
	/// range keeps insertions at its edges outside of it, and collapses when
	/// its whole extent is deleted. Direction is preserved.
	pub fn map_through(&self, changes: &ChangeSet) -> Self {
		if self.is_empty() {
			return Self::point(changes.map_pos(self.head, Bias::Right));
		}

		let from = changes.map_pos(self.min(), Bias::Right);
		let to = changes.map_pos(self.max(), Bias::Left).max(from);

		match self.direction() {
			Direction::Forward => Self::new(from, to),
			Direction::Backward => Self::new(to, from),
		}
	}
}
