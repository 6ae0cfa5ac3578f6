//! Integration of authority batches into a session.
//!
//! The host document always shows the confirmed base plus every unconfirmed
//! local update, applied speculatively. A batch from the authority extends
//! the confirmed base; integrating it means (a) dropping the local updates it
//! confirms, (b) moving the remaining ones on top of the foreign changes, and
//! (c) moving the foreign changes on top of the remaining local ones so they
//! can be applied to the host document right away.
//!
//! # Tie-break
//!
//! When a confirmed change and an unconfirmed local change insert at the same
//! position, the confirmed insertion comes first. Every session applies the
//! same rule, which is what makes them converge.
//!
//! ```text
//!   base ──F──▶ base·F              F: foreign changes from the batch
//!    │            │                 U: remaining unconfirmed updates
//!    U            U' = U mapped through F (Right)
//!    ▼            ▼
//!  base·U ─F'─▶ base·F·U'           F': host-facing edit = F mapped through U (Left)
//! ```

use tandem_primitives::{Bias, ChangeSet};
use tracing::{debug, trace};

use crate::effect::{SharedEffect, map_effects};
use crate::error::{DesyncReason, Result};
use crate::state::CollabState;
use crate::update::{LocalUpdate, Transaction, Update};
use crate::ClientId;


/// Bias for unconfirmed changes mapped through confirmed ones.
const UNCONFIRMED: Bias = Bias::Right;
/// Bias for confirmed changes mapped through unconfirmed ones.
const CONFIRMED: Bias = Bias::Left;

/// Outcome of integrating one batch.
#[derive(Debug)]
pub(crate) struct Rebased<E> {
	/// State to replace the session's state with.
	pub state: CollabState<E>,
	/// Edit for the host document, or `None` if the batch only confirmed
	/// local updates.
	pub edit: Option<Transaction<E>>,
}

/// Integrates `updates`, the batches confirmed at versions
/// `state.version() + 1 ..= state.version() + updates.len()`.
///
/// Does not modify `state`; on error nothing is integrated.
pub(crate) fn rebase<E: SharedEffect>(
	state: &CollabState<E>,
	client_id: &ClientId,
	updates: &[Update<E>],
) -> Result<Rebased<E>> {
	let unconfirmed = state.unconfirmed();
	let mut own = 0;
	// Foreign changes seen so far, valid on the base plus the echoes seen so far.
	let mut foreign: Option<ChangeSet> = None;
	// Foreign effects, positioned in the authority's document.
	let mut effects: Vec<E> = Vec::new();

	for (index, update) in updates.iter().enumerate() {
		if update.client_id() == client_id {
			let Some(ours) = unconfirmed.get(own) else {
				return Err(DesyncReason::UnexpectedEcho { index }.into());
			};

			let expected = match &foreign {
				Some(foreign) => ours.changes().map(foreign, UNCONFIRMED)?,
				None => ours.changes().clone(),
			};
			if expected != *update.changes() {
				return Err(DesyncReason::EchoMismatch { index }.into());
			}

			if let Some(changes) = foreign.take() {
				foreign = Some(changes.map(ours.changes(), CONFIRMED)?);
			}
			effects = map_effects(&effects, update.changes());
			own += 1;
			trace!(index, version = state.version() + index as u64 + 1, "echo confirmed");
		} else {
			effects = map_effects(&effects, update.changes());
			effects.extend_from_slice(update.effects());
			foreign = Some(match foreign.take() {
				Some(changes) => changes.compose(update.changes().clone())?,
				None => update.changes().clone(),
			});
			trace!(
				index,
				version = state.version() + index as u64 + 1,
				client = %update.client_id(),
				"foreign update integrated"
			);
		}
	}

	let remaining = &unconfirmed[own..];
	let mut rebased: Vec<LocalUpdate<E>> = Vec::with_capacity(remaining.len());
	match foreign.as_mut() {
		Some(foreign) => {
			for local in remaining {
				let changes = local.changes().map(foreign, UNCONFIRMED)?;
				*foreign = foreign.map(local.changes(), CONFIRMED)?;
				let local_effects = map_effects(local.effects(), foreign);
				rebased.push(local.rebased(Update::new(changes, local_effects, client_id.clone())));
			}
		}
		None => rebased.extend_from_slice(remaining),
	}

	// Effects are positioned in the authority's document; the host document
	// additionally shows the rebased local updates.
	if !effects.is_empty() {
		for local in &rebased {
			effects = map_effects(&effects, local.changes());
		}
	}

	let version = state.version() + updates.len() as u64;
	debug!(
		version,
		echoes = own,
		foreign = updates.len() - own,
		pending = rebased.len(),
		"integrated authority batch"
	);

	Ok(Rebased {
		state: CollabState::from_parts(version, rebased),
		edit: foreign.map(|changes| Transaction::remote(changes, effects)),
	})
}
