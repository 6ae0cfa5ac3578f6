use ropey::Rope;
use serde::{Deserialize, Serialize};

use super::cursor::OpCursor;
use super::error::ChangeError;
use super::types::{Bias, Change, Insertion, Operation, Tendril};
use crate::range::{CharIdx, CharLen};

/// A sequence of operations representing a set of changes to a document.
///
/// ChangeSet uses Operational Transformation (OT) principles to represent document
/// changes as a sequence of retain, delete, and insert operations. This representation
/// enables composition, inversion, position mapping, and mapping one change set
/// through another concurrent one.
///
/// The operation list is kept canonical: adjacent operations of the same kind
/// are merged and an insertion always precedes a deletion at the same position.
/// An insertion after a deletion belongs to the position where the deletion
/// ends, so `[Delete, Insert]` and `[Insert, Delete]` are different edits.
///
/// Serializes as its operation list; lengths are re-derived on deserialize.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Operation>", into = "Vec<Operation>")]
pub struct ChangeSet {
	/// Sequence of retain/delete/insert operations.
	changes: Vec<Operation>,
	/// Length of the source document before changes.
	len: CharLen,
	/// Length of the document after applying changes.
	len_after: CharLen,
}

impl ChangeSet {
	/// Creates a changeset that leaves a `len`-char document untouched.
	pub fn empty(len: CharLen) -> Self {
		let mut cs = Self::default();
		cs.retain(len);
		cs
	}

	/// Builds a changeset from replacements over a `len`-char document.
	///
	/// Changes must be in ascending order and must not overlap. Several
	/// insertions at the same position are applied in the order given.
	///
	/// # Errors
	/// Returns [`ChangeError::InvalidChange`] for a change that is out of
	/// bounds, has `start > end`, or starts before the previous one ended.
	pub fn from_changes(
		len: CharLen,
		changes: impl IntoIterator<Item = Change>,
	) -> Result<Self, ChangeError> {
		let mut cs = Self::default();
		let mut last = 0;

		for change in changes {
			if change.start < last || change.start > change.end || change.end > len {
				return Err(ChangeError::InvalidChange {
					start: change.start,
					end: change.end,
					len,
				});
			}

			cs.retain(change.start - last);
			if let Some(text) = change.replacement {
				cs.insert(text);
			}
			cs.delete(change.end - change.start);
			last = change.end;
		}

		cs.retain(len - last);
		Ok(cs)
	}

	/// Creates a changeset inserting `text` at `pos` in a `len`-char document.
	///
	/// # Errors
	/// Returns [`ChangeError::InvalidChange`] if `pos > len`.
	pub fn insert_text(len: CharLen, pos: CharIdx, text: impl Into<Tendril>) -> Result<Self, ChangeError> {
		Self::from_changes(len, [Change::insert(pos, text)])
	}

	/// Creates a changeset deleting `[start, end)` from a `len`-char document.
	///
	/// # Errors
	/// Returns [`ChangeError::InvalidChange`] if the range is inverted or out of bounds.
	pub fn delete_range(len: CharLen, start: CharIdx, end: CharIdx) -> Result<Self, ChangeError> {
		Self::from_changes(len, [Change::delete(start, end)])
	}

	/// Returns the length of the source document (before changes).
	pub fn len(&self) -> CharLen {
		self.len
	}

	/// Returns the length of the document after applying changes.
	pub fn len_after(&self) -> CharLen {
		self.len_after
	}

	/// Returns true if this changeset contains no operations.
	///
	/// Only a changeset over an empty document with no insertions is empty;
	/// see [`Self::is_identity`] for "changes nothing".
	pub fn is_empty(&self) -> bool {
		self.changes.is_empty()
	}

	/// Returns true if applying this changeset leaves the document unchanged.
	pub fn is_identity(&self) -> bool {
		self.changes.iter().all(|op| matches!(op, Operation::Retain(_)))
	}

	/// Returns a slice of all operations in this changeset.
	pub fn changes(&self) -> &[Operation] {
		&self.changes
	}

	/// Adds a retain operation, preserving N characters from the source.
	pub(crate) fn retain(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;
		self.len_after += n;

		if let Some(Operation::Retain(count)) = self.changes.last_mut() {
			*count += n;
		} else {
			self.changes.push(Operation::Retain(n));
		}
	}

	/// Adds a delete operation, removing N characters from the source.
	pub(crate) fn delete(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;

		if let Some(Operation::Delete(count)) = self.changes.last_mut() {
			*count += n;
		} else {
			self.changes.push(Operation::Delete(n));
		}
	}

	/// Adds an insert operation, inserting text at the current position.
	pub(crate) fn insert(&mut self, text: Tendril) {
		self.push_insertion(Insertion::new(text));
	}

	/// Adds an insertion whose length is already known.
	///
	/// Merges with an insertion directly before it. An insertion is never
	/// moved across a delete already emitted: it sits at the end of the
	/// deleted run, and mapping ties depend on that position.
	fn push_insertion(&mut self, ins: Insertion) {
		if ins.is_empty() {
			return;
		}

		self.len_after += ins.char_len();

		if let Some(Operation::Insert(prev)) = self.changes.last_mut() {
			prev.push_str(&ins);
		} else {
			self.changes.push(Operation::Insert(ins));
		}
	}

	/// Applies this changeset to a document, modifying it in place.
	///
	/// # Debug Assertions
	/// Asserts that `doc` has the length this changeset was built against.
	pub fn apply(&self, doc: &mut Rope) {
		debug_assert_eq!(doc.len_chars(), self.len);

		let mut pos = 0;
		for op in &self.changes {
			match op {
				Operation::Retain(n) => {
					pos += n;
				}
				Operation::Delete(n) => {
					doc.remove(pos..pos + n);
				}
				Operation::Insert(ins) => {
					doc.insert(pos, ins.text());
					pos += ins.char_len();
				}
			}
		}
	}

	/// Inverts this changeset to create one that undoes its effects.
	///
	/// # Parameters
	/// - `doc`: The original document (before changes were applied)
	pub fn invert(&self, doc: &Rope) -> ChangeSet {
		let mut result = ChangeSet::default();

		let mut pos = 0;
		for op in &self.changes {
			match op {
				Operation::Retain(n) => {
					result.retain(*n);
					pos += n;
				}
				Operation::Delete(n) => {
					result.insert(doc.slice(pos..pos + n).to_string());
					pos += n;
				}
				Operation::Insert(ins) => {
					result.delete(ins.char_len());
				}
			}
		}

		result
	}

	/// Maps a position through this changeset using the specified bias.
	///
	/// Positions inside a deleted range collapse to the start of the deletion.
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		let mut old_pos = 0;
		let mut new_pos = 0;

		for op in &self.changes {
			if old_pos > pos {
				break;
			}

			match op {
				Operation::Retain(n) => {
					if old_pos + n > pos {
						return new_pos + (pos - old_pos);
					}
					old_pos += n;
					new_pos += n;
				}
				Operation::Delete(n) => {
					if old_pos + n > pos {
						return new_pos;
					}
					old_pos += n;
				}
				Operation::Insert(ins) => {
					if old_pos == pos && bias == Bias::Left {
						// Position is exactly at insert point, stay before
					} else {
						new_pos += ins.char_len();
					}
				}
			}
		}

		new_pos + (pos - old_pos)
	}

	/// Composes two changesets into a single equivalent changeset.
	///
	/// The result is equivalent to applying `self` then `other`.
	///
	/// # Errors
	/// Returns [`ChangeError::LengthMismatch`] unless `other` was built against
	/// the document `self` produces.
	pub fn compose(self, other: ChangeSet) -> Result<ChangeSet, ChangeError> {
		let mismatch = ChangeError::LengthMismatch {
			expected: self.len_after,
			actual: other.len,
		};
		if self.len_after != other.len {
			return Err(mismatch);
		}

		let mut result = ChangeSet::default();
		let mut a = OpCursor::new(self.changes);
		let mut b = OpCursor::new(other.changes);

		loop {
			// Text inserted by `other` never touched `self`'s output.
			if b.is_insert() {
				if let Some(Operation::Insert(ins)) = b.pop() {
					result.push_insertion(ins);
				}
				continue;
			}
			// Text deleted by `self` is invisible to `other`.
			if a.is_delete() {
				if let Some(op) = a.pop() {
					result.delete(op.len());
				}
				continue;
			}

			let n = match (a.head_len(), b.head_len()) {
				(None, None) => break,
				(Some(a_len), Some(b_len)) => a_len.min(b_len),
				_ => return Err(mismatch),
			};

			match (a.take(n), b.take(n)) {
				(Some(Operation::Retain(_)), Some(Operation::Retain(_))) => result.retain(n),
				(Some(Operation::Retain(_)), Some(Operation::Delete(_))) => result.delete(n),
				(Some(Operation::Insert(ins)), Some(Operation::Retain(_))) => result.push_insertion(ins),
				(Some(Operation::Insert(_)), Some(Operation::Delete(_))) => {}
				_ => unreachable!("deletes on the left and inserts on the right are consumed above"),
			}
		}

		Ok(result)
	}

	/// Maps this changeset through `other`, a concurrent changeset built
	/// against the same document.
	///
	/// The result describes this changeset's edits as they apply to the
	/// document produced by `other`. When both insert at the same position,
	/// `bias` decides whose text comes first: [`Bias::Left`] places this
	/// changeset's insertion before `other`'s, [`Bias::Right`] after it.
	///
	/// For concurrent `a` and `b`, `b.compose(a.map(&b, bias))` and
	/// `a.compose(b.map(&a, opposite bias))` produce the same document.
	///
	/// # Errors
	/// Returns [`ChangeError::LengthMismatch`] if the two changesets were built
	/// against documents of different lengths.
	pub fn map(&self, other: &ChangeSet, bias: Bias) -> Result<ChangeSet, ChangeError> {
		let mismatch = ChangeError::LengthMismatch {
			expected: other.len,
			actual: self.len,
		};
		if self.len != other.len {
			return Err(mismatch);
		}

		let mut result = ChangeSet::default();
		let mut a = OpCursor::new(self.changes.clone());
		let mut b = OpCursor::new(other.changes.clone());

		loop {
			if a.is_insert() && (bias == Bias::Left || !b.is_insert()) {
				if let Some(Operation::Insert(ins)) = a.pop() {
					result.push_insertion(ins);
				}
				continue;
			}
			if b.is_insert() {
				if let Some(op) = b.pop() {
					result.retain(op.len());
				}
				continue;
			}

			let n = match (a.head_len(), b.head_len()) {
				(None, None) => break,
				(Some(a_len), Some(b_len)) => a_len.min(b_len),
				_ => return Err(mismatch),
			};

			match (a.take(n), b.take(n)) {
				(Some(Operation::Retain(_)), Some(Operation::Retain(_))) => result.retain(n),
				(Some(Operation::Delete(_)), Some(Operation::Retain(_))) => result.delete(n),
				// Already removed by `other`.
				_ => {}
			}
		}

		Ok(result)
	}

	/// Flattens this changeset back into ordered, non-overlapping replacements
	/// expressed in source-document coordinates.
	pub fn to_changes(&self) -> Vec<Change> {
		let mut out: Vec<Change> = Vec::new();
		let mut pos = 0;

		for op in &self.changes {
			match op {
				Operation::Retain(n) => pos += n,
				Operation::Delete(n) => {
					match out.last_mut() {
						Some(prev) if prev.end == pos => prev.end += n,
						_ => out.push(Change::delete(pos, pos + n)),
					}
					pos += n;
				}
				Operation::Insert(ins) => out.push(Change::insert(pos, ins.text())),
			}
		}

		out
	}
}

impl From<Vec<Operation>> for ChangeSet {
	fn from(ops: Vec<Operation>) -> Self {
		let mut cs = ChangeSet::default();
		for op in ops {
			match op {
				Operation::Retain(n) => cs.retain(n),
				Operation::Delete(n) => cs.delete(n),
				Operation::Insert(ins) => cs.push_insertion(ins),
			}
		}
		cs
	}
}

impl From<ChangeSet> for Vec<Operation> {
	fn from(cs: ChangeSet) -> Self {
		cs.changes
	}
}
