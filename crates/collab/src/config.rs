//! Session configuration.

use std::fmt;
use std::sync::Arc;

use crate::ClientId;
use crate::effect::NoEffect;
use crate::update::Transaction;

/// Derives the effects to share from a local transaction.
pub type SharedEffectsFn<E> = Arc<dyn Fn(&Transaction<E>) -> Vec<E> + Send + Sync>;

/// Session configuration, fixed at construction.
///
/// ```
/// use tandem_collab::{CollabConfig, CursorEffect};
///
/// let config = CollabConfig::<CursorEffect>::default()
/// 	.with_start_version(12)
/// 	.with_client_id("alice")
/// 	.with_shared_effects(|tr| tr.effects().to_vec());
/// assert_eq!(config.start_version, 12);
/// ```
pub struct CollabConfig<E = NoEffect> {
	/// Version of the document the session starts from.
	pub start_version: u64,
	/// This session's identifier. A random one is generated if unset.
	pub client_id: Option<ClientId>,
	/// Picks the effects of a local transaction that are synchronized with
	/// other sessions. Without it, only document changes are shared.
	pub shared_effects: Option<SharedEffectsFn<E>>,
}

impl<E> CollabConfig<E> {
	/// Sets the starting version.
	pub fn with_start_version(mut self, version: u64) -> Self {
		self.start_version = version;
		self
	}

	/// Sets the client identifier.
	pub fn with_client_id(mut self, client_id: impl Into<ClientId>) -> Self {
		self.client_id = Some(client_id.into());
		self
	}

	/// Sets the shared-effects function.
	pub fn with_shared_effects(
		mut self,
		f: impl Fn(&Transaction<E>) -> Vec<E> + Send + Sync + 'static,
	) -> Self {
		self.shared_effects = Some(Arc::new(f));
		self
	}
}

impl<E> Default for CollabConfig<E> {
	fn default() -> Self {
		Self {
			start_version: 0,
			client_id: None,
			shared_effects: None,
		}
	}
}

impl<E> fmt::Debug for CollabConfig<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CollabConfig")
			.field("start_version", &self.start_version)
			.field("client_id", &self.client_id)
			.field("shared_effects", &self.shared_effects.is_some())
			.finish()
	}
}
