use serde::{Deserialize, Serialize};

use crate::range::{CharIdx, CharLen};

/// Owned text carried by insertions.
pub type Tendril = String;

/// A single text replacement.
///
/// Replaces the char range `[start, end)` with the optional `replacement`
/// text. If `replacement` is [`None`], this is a pure deletion; if the range
/// is empty, a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
	/// The starting character index of the change.
	pub start: CharIdx,
	/// The ending character index of the change (exclusive).
	pub end: CharIdx,
	/// The replacement text, or [`None`] for deletion.
	pub replacement: Option<Tendril>,
}

impl Change {
	/// Creates an insertion of `text` at `pos`.
	pub fn insert(pos: CharIdx, text: impl Into<Tendril>) -> Self {
		Self {
			start: pos,
			end: pos,
			replacement: Some(text.into()),
		}
	}

	/// Creates a deletion of `[start, end)`.
	pub fn delete(start: CharIdx, end: CharIdx) -> Self {
		Self {
			start,
			end,
			replacement: None,
		}
	}

	/// Creates a replacement of `[start, end)` with `text`.
	pub fn replace(start: CharIdx, end: CharIdx, text: impl Into<Tendril>) -> Self {
		Self {
			start,
			end,
			replacement: Some(text.into()),
		}
	}
}

/// Which side of a shared insertion point something lands on.
///
/// For positions, bias decides whether a position sitting exactly where text
/// is inserted stays before the new text or moves past it. For change sets
/// mapped through one another, it decides whose insertions come first when
/// both insert at the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Stays before insertions at the same location.
	Left,
	/// Moves after insertions at the same location.
	Right,
}

/// A text insertion with cached character length.
///
/// Fields are private to enforce the invariant that `char_len` always equals
/// `text.chars().count()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Tendril", into = "Tendril")]
pub struct Insertion {
	text: Tendril,
	char_len: CharLen,
}

impl Insertion {
	/// Creates a new insertion, computing the character length once.
	#[inline]
	pub fn new(text: Tendril) -> Self {
		let char_len = text.chars().count();
		Self { text, char_len }
	}

	/// Creates an insertion with a pre-computed length.
	///
	/// # Debug Assertions
	/// In debug builds, asserts that `char_len` matches the actual character count.
	#[inline]
	pub fn from_chars(text: Tendril, char_len: CharLen) -> Self {
		debug_assert_eq!(text.chars().count(), char_len);
		Self { text, char_len }
	}

	/// Returns true if this insertion is empty.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.char_len == 0
	}

	/// Returns the inserted text.
	#[inline]
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Returns the cached character length.
	#[inline]
	pub fn char_len(&self) -> CharLen {
		self.char_len
	}

	/// Appends text from another insertion, updating the cached length.
	pub(super) fn push_str(&mut self, other: &Insertion) {
		self.text.push_str(&other.text);
		self.char_len += other.char_len;
	}

	/// Splits off the first `n` characters, returning them as a new string.
	///
	/// The remaining insertion has its char_len reduced accordingly.
	pub(super) fn take_prefix(&mut self, n: CharLen) -> Tendril {
		debug_assert!(n <= self.char_len);
		let split = self.text.char_indices().nth(n).map_or(self.text.len(), |(idx, _)| idx);
		let rest = self.text.split_off(split);
		self.char_len -= n;
		std::mem::replace(&mut self.text, rest)
	}
}

impl From<Tendril> for Insertion {
	fn from(text: Tendril) -> Self {
		Self::new(text)
	}
}

impl From<Insertion> for Tendril {
	fn from(ins: Insertion) -> Self {
		ins.text
	}
}

/// A single operation in a changeset.
///
/// Operations walk the source document from start to end: retain keeps
/// characters, delete drops them, insert adds new text at the current
/// position without consuming any source characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
	/// Retain the next N characters from the source document.
	Retain(CharLen),
	/// Delete the next N characters from the source document.
	Delete(CharLen),
	/// Insert new text at the current position.
	Insert(Insertion),
}

impl Operation {
	/// Number of characters this operation spans.
	///
	/// Source characters for retain and delete, inserted characters for insert.
	#[inline]
	#[allow(clippy::len_without_is_empty, reason = "the builder never emits zero-length operations")]
	pub fn len(&self) -> CharLen {
		match self {
			Operation::Retain(n) | Operation::Delete(n) => *n,
			Operation::Insert(ins) => ins.char_len(),
		}
	}
}
