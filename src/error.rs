use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
	#[error("Model '{0}' not found")]
	ModelNotFound(i64),

	#[error("Template ordinal {ordinal} out of range for {len} templates")]
	TemplateOutOfRange { ordinal: usize, len: usize },

	#[error("Cannot delete the only template of a note type")]
	LastTemplate,

	#[error("Deleting this template would leave {0} notes without cards")]
	WouldOrphanNotes(usize),

	#[error("Cloze note types cannot have templates added")]
	ClozeTemplates,

	#[error("Change log invariant violated: {0}")]
	ChangeLogInvariant(String),

	#[error("Cannot replay {change} against {len} entries")]
	Replay { change: String, len: usize },

	#[error("An editing session for model '{open}' is pending, not '{requested}'")]
	SessionModelMismatch { open: i64, requested: i64 },

	#[error("No editing session state found at '{0}'")]
	NoSessionState(PathBuf),

	#[error("Session state version {found} is incompatible with {supported}")]
	IncompatibleState { found: semver::Version, supported: semver::Version },

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Toml(#[from] toml::de::Error),
}
