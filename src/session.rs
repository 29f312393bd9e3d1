//! An editing session over one note type: a private copy of the model that the
//! user edits, plus the log of template adds and deletes needed to carry those
//! edits over to the collection's cards. Nothing reaches the collection until
//! [`EditorSession::commit`].

use std::path::{Path, PathBuf};

use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{change_resolver::persisted_ordinals, change_tracker::TemplateChanges, error::EditorError, temp_models::{clear_temp_model_files, get_temp_model, save_temp_model}, types::{change::ChangeKind, collection::Collection, model::{NoteModel, NoteModelType, Template}}};

pub const STATE_FILE: &str = "editorState.json";
pub const STATE_VERSION: Version = Version::new(1, 0, 0);

/// What a session needs to pick up where it left off in another process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
	pub version:           Version,
	pub model_id:          i64,
	// Only present when the edited model differs from the stored one
	pub edited_model_file: Option<PathBuf>,
	pub template_changes:  TemplateChanges,
}

#[derive(Debug, Clone)]
pub struct EditorSession {
	model_id: i64,
	edited:   NoteModel,
	changes:  TemplateChanges,
}

pub fn state_path(cache_dir: &Path) -> PathBuf { cache_dir.join(STATE_FILE) }

impl EditorSession {
	/// Starts editing a fresh copy of the stored model.
	#[instrument(skip(collection))]
	pub fn open(collection: &Collection, model_id: i64) -> Result<Self, EditorError> {
		let edited = collection.model(model_id)?.clone();
		info!("Template editor started for model {} ({})", model_id, edited.name);
		Ok(Self { model_id, edited, changes: TemplateChanges::new() })
	}

	/// Rebuilds the session saved by [`EditorSession::save_state`].
	#[instrument(skip(collection))]
	pub fn restore(collection: &Collection, cache_dir: &Path) -> Result<Self, EditorError> {
		let path = state_path(cache_dir);
		if !path.is_file() {
			return Err(EditorError::NoSessionState(path));
		}

		let state: SessionState = serde_json::from_slice(&fs_err::read(&path)?)?;
		if state.version.major != STATE_VERSION.major || state.version > STATE_VERSION {
			return Err(EditorError::IncompatibleState { found: state.version, supported: STATE_VERSION });
		}

		let edited = match &state.edited_model_file {
			Some(file) => get_temp_model(file)?,
			None => collection.model(state.model_id)?.clone(),
		};

		debug!("Restored session for model {} with {} pending changes", state.model_id, state.template_changes.len());
		Ok(Self { model_id: state.model_id, edited, changes: state.template_changes })
	}

	/// Resumes the pending session if there is one for `model_id`, otherwise
	/// opens a new one. A pending session for another model is left alone.
	#[instrument(skip(collection))]
	pub fn resume_or_open(collection: &Collection, cache_dir: &Path, model_id: i64) -> Result<Self, EditorError> {
		if !state_path(cache_dir).is_file() {
			return Self::open(collection, model_id);
		}

		let session = Self::restore(collection, cache_dir)?;
		if session.model_id != model_id {
			return Err(EditorError::SessionModelMismatch { open: session.model_id, requested: model_id });
		}
		Ok(session)
	}

	/// Persists the session into `cache_dir`, replacing any earlier save.
	#[instrument(skip(self, collection), fields(model = self.model_id))]
	pub fn save_state(&self, collection: &Collection, cache_dir: &Path) -> Result<PathBuf, EditorError> {
		fs_err::create_dir_all(cache_dir)?;
		clear_temp_model_files(cache_dir)?;

		let edited_model_file = if self.model_has_changed(collection)? {
			Some(save_temp_model(cache_dir, &self.edited)?)
		} else {
			None
		};

		let state = SessionState {
			version: STATE_VERSION,
			model_id: self.model_id,
			edited_model_file,
			template_changes: self.changes.clone(),
		};

		let path = state_path(cache_dir);
		fs_err::write(&path, serde_json::to_vec(&state)?)?;
		debug!("Saved session state to {:?}", path);
		Ok(path)
	}

	pub fn model_id(&self) -> i64 { self.model_id }

	pub fn edited_model(&self) -> &NoteModel { &self.edited }

	pub fn template_changes(&self) -> &TemplateChanges { &self.changes }

	pub fn model_has_changed(&self, collection: &Collection) -> Result<bool, EditorError> {
		Ok(collection.model(self.model_id)? != &self.edited)
	}

	pub fn set_front(&mut self, ord: usize, text: impl Into<String>) -> Result<(), EditorError> {
		self.edited.template_mut(ord)?.qfmt = text.into();
		Ok(())
	}

	pub fn set_back(&mut self, ord: usize, text: impl Into<String>) -> Result<(), EditorError> {
		self.edited.template_mut(ord)?.afmt = text.into();
		Ok(())
	}

	pub fn set_css(&mut self, css: impl Into<String>) { self.edited.css = css.into(); }

	/// Appends a new template based on the one at `from_position` and returns
	/// its ordinal. The only template of a model is copied reversed.
	#[instrument(skip(self), fields(model = self.model_id))]
	pub fn add_template(&mut self, from_position: usize) -> Result<usize, EditorError> {
		if self.edited.kind == NoteModelType::Cloze {
			return Err(EditorError::ClozeTemplates);
		}

		let source = self.edited.template(from_position)?;
		let mut template = Template::new(self.edited.new_card_name());
		template.qfmt = source.qfmt.clone();
		template.afmt = source.afmt.clone();

		if self.edited.tmpls.len() == 1 {
			template.flip_question_answer();
		}

		let ord = self.edited.tmpls.len();
		template.ord = ord;
		info!("Adding template '{}' at {}", template.name, ord);

		self.edited.tmpls.push(template);
		self.changes.record(ChangeKind::Add, ord)?;
		Ok(ord)
	}

	/// Deletes the template at `ord`. A delete that would leave notes of the
	/// model without any card is refused.
	#[instrument(skip(self, collection), fields(model = self.model_id))]
	pub fn delete_template(&mut self, collection: &Collection, ord: usize) -> Result<(), EditorError> {
		let len = self.edited.tmpls.len();
		if ord >= len {
			return Err(EditorError::TemplateOutOfRange { ordinal: ord, len });
		}
		if len == 1 {
			warn!("Refusing to delete the only template");
			return Err(EditorError::LastTemplate);
		}

		let mut changes = self.changes.clone();
		changes.record(ChangeKind::Delete, ord)?;

		let before = collection.card_counts_after(self.model_id, &self.changes)?;
		let after = collection.card_counts_after(self.model_id, &changes)?;
		let orphaned = before.iter().zip(&after).filter(|((_, had), (_, has))| *had > 0 && *has == 0).count();
		if orphaned > 0 {
			warn!("Refusing to delete template {}, {} notes would have no cards", ord, orphaned);
			return Err(EditorError::WouldOrphanNotes(orphaned));
		}

		let removed = self.edited.tmpls.remove(ord);
		info!("Deleted template '{}' at {}", removed.name, ord);

		self.changes = changes;
		self.edited.update_template_ords();
		Ok(())
	}

	/// The stored ordinal of the edited template at `ord`, `None` when the
	/// template was added in this session.
	pub fn persisted_ordinal(&self, collection: &Collection, ord: usize) -> Result<Option<usize>, EditorError> {
		let stored = collection.model(self.model_id)?.tmpls.len();
		let ordinals = persisted_ordinals(&self.changes, stored)?;
		ordinals
			.get(ord)
			.copied()
			.ok_or(EditorError::TemplateOutOfRange { ordinal: ord, len: ordinals.len() })
	}

	/// Writes the edited model out for a previewer when it differs from the
	/// stored one.
	#[instrument(skip(self, collection), fields(model = self.model_id))]
	pub fn export_for_preview(&self, collection: &Collection, cache_dir: &Path) -> Result<Option<PathBuf>, EditorError> {
		if !self.model_has_changed(collection)? {
			return Ok(None);
		}
		save_temp_model(cache_dir, &self.edited).map(Some)
	}

	/// Stores the edits in the collection and ends the session. Returns whether
	/// anything had to be saved.
	#[instrument(skip(self, collection), fields(model = self.model_id))]
	pub fn commit(self, collection: &mut Collection, cache_dir: &Path) -> Result<bool, EditorError> {
		let changed = self.model_has_changed(collection)?;

		if changed {
			// The pending session stays on disk until the collection is written
			let mut updated = collection.clone();
			updated.save_model(&self.edited, &self.changes)?;
			updated.save()?;
			*collection = updated;
			info!("Committed model {} with {} template changes", self.model_id, self.changes.len());
		} else {
			debug!("Nothing to commit");
		}

		clear_temp_model_files(cache_dir)?;
		remove_state(cache_dir)?;
		Ok(changed)
	}

	/// Drops the edits and ends the session.
	#[instrument(skip(self), fields(model = self.model_id))]
	pub fn discard(self, cache_dir: &Path) -> Result<(), EditorError> {
		let cleared = clear_temp_model_files(cache_dir)?;
		remove_state(cache_dir)?;
		info!("Discarded edits to model {} ({} temp files removed)", self.model_id, cleared);
		Ok(())
	}
}

fn remove_state(cache_dir: &Path) -> Result<(), EditorError> {
	let path = state_path(cache_dir);
	if path.is_file() {
		fs_err::remove_file(&path)?;
	}
	Ok(())
}
