use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct EditorConfig {
	// Collection file the editor reads note types from and commits to
	pub collection: PathBuf,

	// Where edited models and session state are kept between invocations.
	// Falls back to the platform cache directory.
	pub cache_dir: Option<PathBuf>,

	pub log: LogConfig,
}

#[derive(Deserialize, Serialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct LogConfig {
	pub level:        String,
	pub stdout_spans: bool,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self { collection: PathBuf::from("collection.json"), cache_dir: None, log: LogConfig::default() }
	}
}

impl Default for LogConfig {
	fn default() -> Self { Self { level: "warn".to_string(), stdout_spans: false } }
}
