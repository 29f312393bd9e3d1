use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, info, instrument};

use crate::{error::EditorError, types::config::EditorConfig};

pub const CONFIG_FILE: &str = "flash-templates.toml";

fn project_dirs() -> Option<ProjectDirs> { ProjectDirs::from("", "", "flash-templates") }

/// The config file to read when none is given: the platform config directory,
/// if it has one.
pub fn default_config_path() -> Option<PathBuf> {
	project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE)).filter(|path| path.is_file())
}

/// Loads the configuration at `path`, or the default one. A missing default
/// file yields the built-in defaults, a missing explicit file is an error.
#[instrument]
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig, EditorError> {
	let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
		debug!("No configuration file, using defaults");
		return Ok(EditorConfig::default());
	};

	let content = fs_err::read_to_string(&path)?;
	let config: EditorConfig = toml::from_str(&content)?;

	info!("Loaded configuration from {:?}", path);
	Ok(config)
}

impl EditorConfig {
	pub fn resolved_cache_dir(&self) -> PathBuf {
		self.cache_dir
			.clone()
			.or_else(|| project_dirs().map(|dirs| dirs.cache_dir().to_path_buf()))
			.unwrap_or_else(|| PathBuf::from(".cache"))
	}
}
