//! Hands an edited note type between processes through a JSON file in the
//! cache directory, so edits survive the editor being restarted and can be
//! picked up by a previewer without touching the collection.

use std::path::{Path, PathBuf};

use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::{error::EditorError, types::model::NoteModel};

const TEMP_MODEL_PREFIX: &str = "editedTemplate";

fn is_temp_model_file(path: &Path) -> bool {
	path.is_file()
		&& path.extension().and_then(|e| e.to_str()) == Some("json")
		&& path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.contains(TEMP_MODEL_PREFIX))
}

/// Writes `model` to a new temp file in `cache_dir` and returns its path.
#[instrument(skip(model), fields(model = model.id))]
pub fn save_temp_model(cache_dir: &Path, model: &NoteModel) -> Result<PathBuf, EditorError> {
	fs_err::create_dir_all(cache_dir)?;

	let path = cache_dir.join(format!("{}-{}.json", TEMP_MODEL_PREFIX, Uuid::new_v4()));
	let json = serde_json::to_vec(model)?;
	fs_err::write(&path, json).inspect_err(|e| error!("Unable to write temp model: {}", e))?;

	debug!("Saved temp model to {:?}", path);
	Ok(path)
}

/// Reads back a model written by [`save_temp_model`].
#[instrument]
pub fn get_temp_model(path: &Path) -> Result<NoteModel, EditorError> {
	let content = fs_err::read(path).inspect_err(|e| error!("Unable to read temp model: {}", e))?;
	let model = serde_json::from_slice(&content)?;
	Ok(model)
}

/// Deletes every temp model in `cache_dir`, returning how many went away.
#[instrument]
pub fn clear_temp_model_files(cache_dir: &Path) -> Result<usize, EditorError> {
	if !cache_dir.is_dir() {
		return Ok(0);
	}

	let mut deleted = 0;
	for entry in fs_err::read_dir(cache_dir)? {
		let path = entry?.path();
		if !is_temp_model_file(&path) {
			continue;
		}

		match fs_err::remove_file(&path) {
			Ok(()) => {
				debug!("Deleted temp model file {:?}", path);
				deleted += 1;
			}
			Err(e) => warn!("Unable to delete temp file: {}", e),
		}
	}

	Ok(deleted)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::types::model::{NoteModelType, Template};

	fn model() -> NoteModel {
		NoteModel {
			id:         42,
			name:       "Basic".into(),
			kind:       NoteModelType::Standard,
			modified:   1,
			flds:       Vec::new(),
			tmpls:      vec![Template { qfmt: "{{Front}}".into(), afmt: "{{Back}}".into(), ..Template::new("Card 1") }],
			css:        ".card {}".into(),
			sortf:      0,
			did:        None,
			latex_pre:  String::new(),
			latex_post: String::new(),
			tags:       Vec::new(),
			vers:       Vec::new(),
		}
	}

	#[test]
	fn temp_model_storage() {
		let dir = tempfile::tempdir().unwrap();
		fs_err::write(dir.path().join("unrelated.json"), "{}").unwrap();

		let path = save_temp_model(dir.path(), &model()).unwrap();
		assert_eq!(get_temp_model(&path).unwrap(), model());

		assert_eq!(clear_temp_model_files(dir.path()).unwrap(), 1);
		assert!(get_temp_model(&path).is_err());
		assert!(dir.path().join("unrelated.json").exists());
	}

	#[test]
	fn each_save_gets_its_own_file() {
		let dir = tempfile::tempdir().unwrap();
		let first = save_temp_model(dir.path(), &model()).unwrap();
		let second = save_temp_model(dir.path(), &model()).unwrap();

		assert_ne!(first, second);
		assert_eq!(clear_temp_model_files(dir.path()).unwrap(), 2);
	}

	#[test]
	fn corrupt_temp_model_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("editedTemplate-broken.json");
		fs_err::write(&path, "{foo: bar}").unwrap();

		assert!(matches!(get_temp_model(&path), Err(EditorError::Json(_))));
	}

	#[test]
	fn clearing_a_missing_directory_is_a_no_op() {
		let dir = tempfile::tempdir().unwrap();
		assert_eq!(clear_temp_model_files(&dir.path().join("absent")).unwrap(), 0);
	}
}
