//! Bookkeeping for template adds and deletes made before a note type is saved.
//!
//! Deleting a template shifts the ordinals of every card above it, so the
//! collection has to see the operations in the order the user made them. A
//! template that is added and then deleted again within the same session never
//! reaches the collection at all: the pair is compacted out of the log and the
//! entries recorded after the add are re-based onto the list without it.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{error::EditorError, types::change::{ChangeKind, TemplateChange}};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateChanges {
	entries: Vec<TemplateChange>,
}

impl TemplateChanges {
	pub fn new() -> Self { Self::default() }

	pub fn entries(&self) -> &[TemplateChange] { &self.entries }

	pub fn len(&self) -> usize { self.entries.len() }

	pub fn is_empty(&self) -> bool { self.entries.is_empty() }

	pub fn iter(&self) -> std::slice::Iter<'_, TemplateChange> { self.entries.iter() }

	pub fn clear(&mut self) { self.entries.clear(); }

	/// Records a user action against the template at `ordinal` of the live list.
	///
	/// A delete of a template that was added earlier in the session (after
	/// accounting for the deletes recorded since) cancels that add instead of
	/// being appended.
	#[instrument(skip(self))]
	pub fn record(&mut self, kind: ChangeKind, ordinal: usize) -> Result<(), EditorError> {
		debug!("Recording {} for ordinal {}", kind, ordinal);

		if kind == ChangeKind::Delete {
			if let Some(added) = self.cancelled_addition(ordinal) {
				return self.compact(added);
			}
		}

		let change = TemplateChange::new(kind, ordinal);
		debug!("Appended change {}", change);
		self.entries.push(change);
		Ok(())
	}

	/// Looks back through the log for an unsaved add that a delete at `ordinal`
	/// undoes, returning the ordinal that add was recorded with.
	fn cancelled_addition(&self, ordinal: usize) -> Option<usize> {
		let mut adjustment = 0;
		for change in self.entries.iter().rev() {
			match *change {
				TemplateChange::Deletion(deleted) => {
					// A delete at or below us moves our comparison basis
					if deleted <= ordinal + adjustment {
						adjustment += 1;
					}
				}
				TemplateChange::Addition(added) => {
					if added == ordinal + adjustment {
						return Some(added);
					}
				}
			}
		}
		None
	}

	/// Purges the first add of `added_ordinal` and shifts every later entry
	/// that sat above the purged slot down by one.
	fn compact(&mut self, added_ordinal: usize) -> Result<(), EditorError> {
		debug!("Compacting add/delete pair for ordinal added as {}", added_ordinal);

		let position = self
			.entries
			.iter()
			.position(|change| *change == TemplateChange::Addition(added_ordinal))
			.ok_or_else(|| {
				EditorError::ChangeLogInvariant(format!("no addition of ordinal {} to compact", added_ordinal))
			})?;

		// Rebase a copy so a failure leaves the log as it was
		let mut entries = self.entries.clone();
		entries.remove(position);

		let mut ordinal_adjustment = 0;
		for change in &mut entries[position..] {
			if change.kind() == ChangeKind::Delete {
				ordinal_adjustment += 1;
			}

			if change.ordinal() + ordinal_adjustment > added_ordinal {
				let ordinal = change.ordinal_mut();
				*ordinal = ordinal.checked_sub(1).ok_or_else(|| {
					EditorError::ChangeLogInvariant(format!("ordinal underflow while compacting {}", added_ordinal))
				})?;
				debug!("Shifted later change down to {}", ordinal);
			}
		}

		self.entries = entries;
		Ok(())
	}
}

impl<'a> IntoIterator for &'a TemplateChanges {
	type IntoIter = std::slice::Iter<'a, TemplateChange>;
	type Item = &'a TemplateChange;

	fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}
