pub mod change_resolver;
pub mod change_tracker;
pub mod collection;
pub mod config_loader;
pub mod error;
pub mod session;
pub mod telemetry;
pub mod temp_models;
pub mod types;

pub use change_tracker::TemplateChanges;
pub use error::EditorError;
pub use session::EditorSession;
pub use types::{change::{ChangeKind, TemplateChange}, collection::Collection, model::NoteModel};
