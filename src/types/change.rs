use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
	Add,
	Delete,
}

/// A single template add or delete, recorded against the ordinal the template
/// had in the in-memory list at the moment the user acted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ord", rename_all = "lowercase")]
pub enum TemplateChange {
	Addition(usize),
	Deletion(usize),
}

impl TemplateChange {
	pub fn new(kind: ChangeKind, ordinal: usize) -> Self {
		match kind {
			ChangeKind::Add => Self::Addition(ordinal),
			ChangeKind::Delete => Self::Deletion(ordinal),
		}
	}

	pub fn ordinal(&self) -> usize {
		match self {
			Self::Addition(ordinal) | Self::Deletion(ordinal) => *ordinal,
		}
	}

	pub fn kind(&self) -> ChangeKind {
		match self {
			Self::Addition(_) => ChangeKind::Add,
			Self::Deletion(_) => ChangeKind::Delete,
		}
	}

	pub(crate) fn ordinal_mut(&mut self) -> &mut usize {
		match self {
			Self::Addition(ordinal) | Self::Deletion(ordinal) => ordinal,
		}
	}
}

impl fmt::Display for ChangeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ChangeKind::Add => write!(f, "ADD"),
			ChangeKind::Delete => write!(f, "DELETE"),
		}
	}
}

impl fmt::Display for TemplateChange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.ordinal(), self.kind())
	}
}
