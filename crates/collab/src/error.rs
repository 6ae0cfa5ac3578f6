//! Error types for batch integration.

use tandem_primitives::ChangeError;
use thiserror::Error;

/// Result alias for collab operations.
pub type Result<T, E = CollabError> = std::result::Result<T, E>;

/// Errors raised while integrating authority batches.
///
/// Integration is all-or-nothing: when any of these is returned the session
/// state is exactly what it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollabError {
	/// A batch carried change sets whose lengths do not line up.
	///
	/// Malformed upstream data. The offending batch is rejected; the session
	/// itself remains usable.
	#[error("malformed batch: {0}")]
	Change(#[from] ChangeError),
	/// The authority's history and this session's history have diverged.
	///
	/// Not recoverable locally: discard local state, fetch a fresh snapshot
	/// and version, and [`reset`](crate::Collab::reset).
	#[error("protocol desync: {0}")]
	ProtocolDesync(DesyncReason),
}

impl CollabError {
	/// Returns true if the session must resynchronize from scratch.
	pub fn is_fatal(&self) -> bool {
		matches!(self, CollabError::ProtocolDesync(_))
	}
}

impl From<DesyncReason> for CollabError {
	fn from(reason: DesyncReason) -> Self {
		CollabError::ProtocolDesync(reason)
	}
}

/// Why a batch was judged out of step with this session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesyncReason {
	/// An echo's changes differ from the unconfirmed update it confirms.
	#[error("echo at batch index {index} does not match the oldest unconfirmed update")]
	EchoMismatch {
		/// Position of the echo within the received batch.
		index: usize,
	},
	/// An echo arrived after every unconfirmed update was already confirmed.
	#[error("echo at batch index {index} has no unconfirmed update to confirm")]
	UnexpectedEcho {
		/// Position of the echo within the received batch.
		index: usize,
	},
	/// A batch did not start right after the synced version.
	#[error("expected a batch starting at version {expected}, got one starting at {received}")]
	VersionGap {
		/// First version this session can integrate.
		expected: u64,
		/// First version of the received batch.
		received: u64,
	},
}
