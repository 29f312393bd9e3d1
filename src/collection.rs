use std::{collections::HashSet, path::{Path, PathBuf}, time::{SystemTime, UNIX_EPOCH}};

use tracing::{debug, info, instrument, warn};

use crate::{change_resolver::apply_changes, change_tracker::TemplateChanges, error::EditorError, types::{change::TemplateChange, collection::{Card, Collection, Note}, model::{NoteModel, Template}}};

fn now_seconds() -> i64 {
	SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or_default()
}

impl Collection {
	pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into(), ..Default::default() } }

	#[instrument]
	pub fn open(path: &Path) -> Result<Self, EditorError> {
		info!("Opening collection at {:?}", path);

		let content = fs_err::read(path)?;
		let mut collection: Collection = serde_json::from_slice(&content)?;
		collection.path = path.to_path_buf();

		debug!(
			"Collection has {} models, {} notes, {} cards",
			collection.models.len(),
			collection.notes.len(),
			collection.cards.len()
		);
		Ok(collection)
	}

	/// Writes the collection back to where it was opened from, replacing the
	/// previous file only once the new one is fully written.
	#[instrument(skip(self), fields(path = ?self.path))]
	pub fn save(&self) -> Result<(), EditorError> {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs_err::create_dir_all(parent)?;
		}

		let staging = self.path.with_extension("json.tmp");
		fs_err::write(&staging, serde_json::to_vec_pretty(self)?)?;
		fs_err::rename(&staging, &self.path)?;

		info!("Saved collection");
		Ok(())
	}

	#[instrument(skip(self))]
	pub fn model(&self, id: i64) -> Result<&NoteModel, EditorError> {
		self.models.iter().find(|model| model.id == id).ok_or_else(|| {
			warn!("Model '{}' not found", id);
			EditorError::ModelNotFound(id)
		})
	}

	fn note_ids(&self, model_id: i64) -> Vec<i64> {
		self.notes.iter().filter(|note| note.mid == model_id).map(|note| note.id).collect()
	}

	fn next_card_id(&self) -> i64 { self.cards.iter().map(|card| card.id).max().unwrap_or(0) + 1 }

	/// Adds a note along with one card per template of its model.
	#[instrument(skip(self, fields))]
	pub fn add_note(&mut self, model_id: i64, fields: Vec<String>) -> Result<i64, EditorError> {
		let templates = self.model(model_id)?.tmpls.len();

		let id = self.notes.iter().map(|note| note.id).max().unwrap_or(0) + 1;
		self.notes.push(Note { id, mid: model_id, flds: fields, tags: Vec::new() });

		for ord in 0..templates {
			let card_id = self.next_card_id();
			self.cards.push(Card { id: card_id, nid: id, ord });
		}

		debug!("Added note {} with {} cards", id, templates);
		Ok(id)
	}

	/// Number of cards generated from the template at `ord` of the stored model.
	pub fn template_use_count(&self, model_id: i64, ord: usize) -> usize {
		let notes: HashSet<i64> = self.note_ids(model_id).into_iter().collect();
		self.cards.iter().filter(|card| card.ord == ord && notes.contains(&card.nid)).count()
	}

	/// Card count of every note of the model once `changes` are replayed onto
	/// its stored templates, in note order.
	pub fn card_counts_after(&self, model_id: i64, changes: &TemplateChanges) -> Result<Vec<(i64, usize)>, EditorError> {
		let templates = self.model(model_id)?.tmpls.len();

		let mut counts = Vec::new();
		for nid in self.note_ids(model_id) {
			let mut slots = vec![false; templates];
			for card in self.cards.iter().filter(|card| card.nid == nid && card.ord < templates) {
				slots[card.ord] = true;
			}
			// Every note gets a card for an added template
			apply_changes(changes, &mut slots, |_| true)?;
			counts.push((nid, slots.into_iter().filter(|has_card| *has_card).count()));
		}
		Ok(counts)
	}

	pub fn mark_schema_modified(&mut self) {
		if !self.schema_modified {
			info!("Schema modified, a full sync will be required");
		}
		self.schema_modified = true;
	}

	/// Stores an edited note type, first replaying its template changes onto
	/// the cards generated from it so card ordinals keep pointing at the same
	/// templates.
	#[instrument(skip(self, edited, changes), fields(model = edited.id, changes = changes.len()))]
	pub fn save_model(&mut self, edited: &NoteModel, changes: &TemplateChanges) -> Result<(), EditorError> {
		let position = self
			.models
			.iter()
			.position(|model| model.id == edited.id)
			.ok_or(EditorError::ModelNotFound(edited.id))?;

		let mut templates = self.models[position].tmpls.clone();
		apply_changes(changes, &mut templates, |ord| Template { ord, ..Default::default() })?;
		if templates.len() != edited.tmpls.len() {
			return Err(EditorError::ChangeLogInvariant(format!(
				"replay leaves {} templates but the edited model has {}",
				templates.len(),
				edited.tmpls.len()
			)));
		}

		let note_ids = self.note_ids(edited.id);
		let notes: HashSet<i64> = note_ids.iter().copied().collect();

		for change in changes {
			match *change {
				TemplateChange::Deletion(ord) => {
					let before = self.cards.len();
					self.cards.retain(|card| !(card.ord == ord && notes.contains(&card.nid)));
					for card in self.cards.iter_mut().filter(|card| card.ord > ord && notes.contains(&card.nid)) {
						card.ord -= 1;
					}
					debug!("Removed {} cards of template {}", before - self.cards.len(), ord);
				}
				TemplateChange::Addition(ord) => {
					for card in self.cards.iter_mut().filter(|card| card.ord >= ord && notes.contains(&card.nid)) {
						card.ord += 1;
					}
					for nid in &note_ids {
						let id = self.next_card_id();
						self.cards.push(Card { id, nid: *nid, ord });
					}
					debug!("Generated {} cards for template {}", note_ids.len(), ord);
				}
			}
		}

		if !changes.is_empty() {
			self.mark_schema_modified();
		}

		let mut model = edited.clone();
		model.modified = now_seconds();
		self.models[position] = model;

		info!("Saved model {}", edited.id);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::types::{change::ChangeKind, model::NoteModelType};

	fn reversed_model() -> NoteModel {
		NoteModel {
			id:         7,
			name:       "Basic (and reversed card)".into(),
			kind:       NoteModelType::Standard,
			modified:   0,
			flds:       Vec::new(),
			tmpls:      vec![
				Template { ord: 0, ..Template::new("Card 1") },
				Template { ord: 1, ..Template::new("Card 2") },
			],
			css:        String::new(),
			sortf:      0,
			did:        None,
			latex_pre:  String::new(),
			latex_post: String::new(),
			tags:       Vec::new(),
			vers:       Vec::new(),
		}
	}

	fn collection(path: &Path) -> Collection {
		let mut collection = Collection::new(path);
		collection.models.push(reversed_model());
		collection.add_note(7, vec!["front".into(), "back".into()]).unwrap();
		collection.add_note(7, vec!["front 2".into(), "back 2".into()]).unwrap();
		collection
	}

	fn ords_of(collection: &Collection, nid: i64) -> Vec<usize> {
		let mut ords: Vec<usize> = collection.cards.iter().filter(|c| c.nid == nid).map(|c| c.ord).collect();
		ords.sort();
		ords
	}

	#[test]
	fn collection_round_trips_through_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("collection.json");
		let original = collection(&path);
		original.save().unwrap();

		let reopened = Collection::open(&path).unwrap();
		assert_eq!(reopened.models, original.models);
		assert_eq!(reopened.cards, original.cards);
		assert_eq!(reopened.path, path);
		assert!(!path.with_extension("json.tmp").exists());
	}

	#[test]
	fn missing_model() {
		let collection = Collection::new("unused.json");
		assert!(matches!(collection.model(3), Err(EditorError::ModelNotFound(3))));
	}

	#[test]
	fn delete_then_add_shifts_cards() {
		let mut collection = collection(Path::new("unused.json"));
		assert_eq!(collection.template_use_count(7, 1), 2);

		let mut edited = reversed_model();
		let mut changes = TemplateChanges::new();
		edited.tmpls.remove(0);
		changes.record(ChangeKind::Delete, 0).unwrap();
		edited.tmpls.push(Template::new("Card 3"));
		changes.record(ChangeKind::Add, 1).unwrap();
		edited.update_template_ords();

		collection.save_model(&edited, &changes).unwrap();

		assert_eq!(ords_of(&collection, 1), vec![0, 1]);
		assert_eq!(ords_of(&collection, 2), vec![0, 1]);
		assert_eq!(collection.cards.len(), 4);
		assert!(collection.schema_modified);
		assert_eq!(collection.model(7).unwrap().tmpls, edited.tmpls);
		assert!(collection.model(7).unwrap().modified > 0);
	}

	#[test]
	fn card_counts_follow_pending_changes() {
		let mut collection = collection(Path::new("unused.json"));
		// Note 2 only keeps its reverse card
		collection.cards.retain(|card| !(card.nid == 2 && card.ord == 0));

		let mut changes = TemplateChanges::new();
		assert_eq!(collection.card_counts_after(7, &changes).unwrap(), vec![(1, 2), (2, 1)]);

		changes.record(ChangeKind::Delete, 1).unwrap();
		assert_eq!(collection.card_counts_after(7, &changes).unwrap(), vec![(1, 1), (2, 0)]);

		changes.record(ChangeKind::Add, 1).unwrap();
		assert_eq!(collection.card_counts_after(7, &changes).unwrap(), vec![(1, 2), (2, 1)]);
	}

	#[test]
	fn formatting_only_save_keeps_schema() {
		let mut collection = collection(Path::new("unused.json"));
		let mut edited = reversed_model();
		edited.css = ".card { color: red }".into();

		collection.save_model(&edited, &TemplateChanges::new()).unwrap();

		assert!(!collection.schema_modified);
		assert_eq!(collection.model(7).unwrap().css, edited.css);
		assert_eq!(collection.cards.len(), 4);
	}

	#[test]
	fn mismatched_change_log_is_rejected() {
		let mut collection = collection(Path::new("unused.json"));
		let mut edited = reversed_model();
		edited.tmpls.pop();

		let result = collection.save_model(&edited, &TemplateChanges::new());

		assert!(matches!(result, Err(EditorError::ChangeLogInvariant(_))));
		assert_eq!(collection.model(7).unwrap().tmpls.len(), 2);
	}
}
