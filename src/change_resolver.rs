//! Replays a template change log onto anything ordered by template ordinal.
//! The collection uses this to rebuild its template list on commit, and the
//! session uses it to work out which stored template an edited one came from.

use tracing::{debug, instrument};

use crate::{change_tracker::TemplateChanges, error::EditorError, types::change::TemplateChange};

/// Applies the changes, in order from earliest to latest, to `substrate`. An
/// addition inserts `make_new(ordinal)` at its ordinal, a deletion removes the
/// element currently at its ordinal.
#[instrument(skip_all, fields(changes = changes.len(), len = substrate.len()))]
pub fn apply_changes<T>(
	changes: &TemplateChanges,
	substrate: &mut Vec<T>,
	mut make_new: impl FnMut(usize) -> T,
) -> Result<(), EditorError> {
	for change in changes {
		match *change {
			TemplateChange::Addition(ordinal) if ordinal <= substrate.len() => {
				substrate.insert(ordinal, make_new(ordinal));
			}
			TemplateChange::Deletion(ordinal) if ordinal < substrate.len() => {
				substrate.remove(ordinal);
			}
			_ => {
				return Err(EditorError::Replay { change: change.to_string(), len: substrate.len() });
			}
		}
		debug!("Replayed {}, {} entries remain", change, substrate.len());
	}

	Ok(())
}

/// Maps every position of the edited template list to the stored ordinal it
/// came from, `None` for templates added since.
pub fn persisted_ordinals(
	changes: &TemplateChanges,
	persisted_len: usize,
) -> Result<Vec<Option<usize>>, EditorError> {
	let mut ordinals: Vec<Option<usize>> = (0..persisted_len).map(Some).collect();
	apply_changes(changes, &mut ordinals, |_| None)?;
	Ok(ordinals)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use proptest::prelude::*;

	use super::*;
	use crate::types::change::ChangeKind;

	#[derive(Debug, Clone, PartialEq)]
	enum Slot {
		Original(usize),
		New,
	}

	#[test]
	fn replay_out_of_range_fails() {
		let mut changes = TemplateChanges::new();
		changes.record(ChangeKind::Delete, 4).unwrap();

		let mut list = vec![1, 2];
		let err = apply_changes(&changes, &mut list, |_| 0).unwrap_err();
		assert!(matches!(err, EditorError::Replay { len: 2, .. }));
	}

	#[test]
	fn persisted_ordinals_follow_deletes() {
		let mut changes = TemplateChanges::new();
		changes.record(ChangeKind::Add, 3).unwrap();
		changes.record(ChangeKind::Delete, 0).unwrap();

		assert_eq!(persisted_ordinals(&changes, 3).unwrap(), vec![Some(1), Some(2), None]);
	}

	proptest! {
		// Adds only ever append, as in the editor
		#[test]
		fn compacted_replay_matches_interactive_edits(
			initial in 1usize..5,
			actions in prop::collection::vec((any::<bool>(), 0usize..100), 1..30),
		) {
			let mut live: Vec<Slot> = (0..initial).map(Slot::Original).collect();
			let mut changes = TemplateChanges::new();

			for (is_add, seed) in actions {
				if is_add || live.len() <= 1 {
					changes.record(ChangeKind::Add, live.len()).unwrap();
					live.push(Slot::New);
				} else {
					let ordinal = seed % live.len();
					changes.record(ChangeKind::Delete, ordinal).unwrap();
					live.remove(ordinal);
				}
			}

			let mut replayed: Vec<Slot> = (0..initial).map(Slot::Original).collect();
			apply_changes(&changes, &mut replayed, |_| Slot::New).unwrap();
			prop_assert_eq!(replayed, live);
		}
	}
}
