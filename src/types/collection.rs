use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::model::NoteModel;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
	#[serde(skip)]
	pub path: PathBuf,

	pub models: Vec<NoteModel>,
	#[serde(default)]
	pub notes:  Vec<Note>,
	#[serde(default)]
	pub cards:  Vec<Card>,

	// Set once a template add or delete forces the next sync to be a full one
	#[serde(default)]
	pub schema_modified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
	pub id:   i64,
	pub mid:  i64,
	pub flds: Vec<String>,
	#[serde(default)]
	pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
	pub id:  i64,
	pub nid: i64,
	pub ord: usize,
}
