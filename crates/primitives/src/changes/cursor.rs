use super::types::{Insertion, Operation};
use crate::range::CharLen;

/// Walks an operation list, splitting the head operation on demand.
///
/// Composition and mapping consume two operation lists in lockstep and rarely
/// line up on operation boundaries, so each side hands out prefixes of its
/// current operation until the operation is exhausted.
pub(super) struct OpCursor {
	ops: std::vec::IntoIter<Operation>,
	head: Option<Operation>,
}

impl OpCursor {
	pub(super) fn new(ops: Vec<Operation>) -> Self {
		let mut ops = ops.into_iter();
		let head = ops.next();
		Self { ops, head }
	}

	/// Length of the current operation, or `None` once exhausted.
	pub(super) fn head_len(&self) -> Option<CharLen> {
		self.head.as_ref().map(Operation::len)
	}

	pub(super) fn is_insert(&self) -> bool {
		matches!(self.head, Some(Operation::Insert(_)))
	}

	pub(super) fn is_delete(&self) -> bool {
		matches!(self.head, Some(Operation::Delete(_)))
	}

	/// Removes and returns the whole current operation.
	pub(super) fn pop(&mut self) -> Option<Operation> {
		std::mem::replace(&mut self.head, self.ops.next())
	}

	/// Removes and returns the first `n` characters of the current operation.
	///
	/// Returns the whole operation when it is no longer than `n`.
	pub(super) fn take(&mut self, n: CharLen) -> Option<Operation> {
		let head = self.head.as_mut()?;
		if head.len() <= n {
			return self.pop();
		}

		Some(match head {
			Operation::Retain(len) => {
				*len -= n;
				Operation::Retain(n)
			}
			Operation::Delete(len) => {
				*len -= n;
				Operation::Delete(n)
			}
			Operation::Insert(ins) => {
				let prefix = ins.take_prefix(n);
				Operation::Insert(Insertion::from_chars(prefix, n))
			}
		})
	}
}
