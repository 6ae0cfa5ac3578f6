use thiserror::Error;

use crate::range::{CharIdx, CharLen};

/// Errors raised when building or combining change sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChangeError {
	/// Two change sets were combined against documents of different lengths.
	///
	/// For composition, `expected` is the output length of the first set and
	/// `actual` the input length of the second. For mapping, both are input
	/// lengths.
	#[error("change set length mismatch: expected a {expected}-char document, got {actual}")]
	LengthMismatch {
		/// Document length the operation required.
		expected: CharLen,
		/// Document length the offending change set was built against.
		actual: CharLen,
	},
	/// A change was out of bounds, inverted, or not in ascending order.
	#[error("invalid change {start}..{end} for a {len}-char document")]
	InvalidChange {
		/// Start of the rejected change.
		start: CharIdx,
		/// End of the rejected change.
		end: CharIdx,
		/// Length of the document the change set was built against.
		len: CharLen,
	},
}
