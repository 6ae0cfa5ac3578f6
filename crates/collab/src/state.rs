use crate::effect::NoEffect;
use crate::update::LocalUpdate;

/// Synchronization state of one session.
///
/// `version` counts the authority batches integrated so far; `unconfirmed`
/// lists locally produced updates not yet acknowledged, oldest first. The
/// rebase engine replaces both fields together.
#[derive(Debug, Clone)]
pub struct CollabState<E = NoEffect> {
	version: u64,
	unconfirmed: Vec<LocalUpdate<E>>,
}

impl<E> CollabState<E> {
	/// Creates a state at `version` with nothing pending.
	pub fn new(version: u64) -> Self {
		Self {
			version,
			unconfirmed: Vec::new(),
		}
	}

	pub(crate) fn from_parts(version: u64, unconfirmed: Vec<LocalUpdate<E>>) -> Self {
		Self { version, unconfirmed }
	}

	/// The last version confirmed by the authority.
	pub fn version(&self) -> u64 {
		self.version
	}

	/// Locally produced updates awaiting confirmation, oldest first.
	pub fn unconfirmed(&self) -> &[LocalUpdate<E>] {
		&self.unconfirmed
	}

	pub(crate) fn push(&mut self, update: LocalUpdate<E>) {
		self.unconfirmed.push(update);
	}
}

impl<E> Default for CollabState<E> {
	fn default() -> Self {
		Self::new(0)
	}
}
