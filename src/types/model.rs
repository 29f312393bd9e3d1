use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteModelType {
	#[default]
	Standard,
	Cloze,
}

impl<'de> Deserialize<'de> for NoteModelType {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let v = i32::deserialize(deserializer)?;
		match v {
			0 => Ok(NoteModelType::Standard),
			1 => Ok(NoteModelType::Cloze),
			_ => Err(serde::de::Error::custom(format!("invalid type: {}", v))),
		}
	}
}

impl Serialize for NoteModelType {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let v = match self {
			NoteModelType::Standard => 0,
			NoteModelType::Cloze => 1,
		};
		serializer.serialize_i32(v)
	}
}

/// A note type as the collection stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteModel {
	pub id:   i64,
	pub name: String,

	#[serde(rename = "type", default)]
	pub kind: NoteModelType,

	// Last modification, seconds since the epoch
	#[serde(rename = "mod", default)]
	pub modified: i64,

	pub flds:  Vec<Field>,
	pub tmpls: Vec<Template>,
	pub css:   String,

	#[serde(default)]
	pub sortf: i32,
	#[serde(default)]
	pub did:   Option<i64>,

	#[serde(rename = "latexPre", default)]
	pub latex_pre:  String,
	#[serde(rename = "latexPost", default)]
	pub latex_post: String,

	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub vers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
	pub name:   String,
	pub ord:    usize,
	#[serde(default)]
	pub sticky: bool,
	#[serde(default)]
	pub rtl:    bool,
	pub font:   String,
	pub size:   u32,
	#[serde(default)]
	pub media:  Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
	pub name:  String,
	pub ord:   usize,
	pub qfmt:  String,
	pub afmt:  String,
	#[serde(default)]
	pub bqfmt: String,
	#[serde(default)]
	pub bafmt: String,

	#[serde(default)]
	pub did: Option<i64>,
}
