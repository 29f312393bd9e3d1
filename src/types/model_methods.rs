use crate::{error::EditorError, types::model::{NoteModel, Template}};

const ANSWER_MARKER: &str = "<hr id=answer>";
const FRONT_SIDE: &str = "{{FrontSide}}";

impl NoteModel {
	pub fn template(&self, ord: usize) -> Result<&Template, EditorError> {
		let len = self.tmpls.len();
		self.tmpls.get(ord).ok_or(EditorError::TemplateOutOfRange { ordinal: ord, len })
	}

	pub fn template_mut(&mut self, ord: usize) -> Result<&mut Template, EditorError> {
		let len = self.tmpls.len();
		self.tmpls.get_mut(ord).ok_or(EditorError::TemplateOutOfRange { ordinal: ord, len })
	}

	/// "Card n" for the first n, starting at the template count plus one, that
	/// no existing template uses.
	pub fn new_card_name(&self) -> String {
		(self.tmpls.len() + 1..)
			.map(|n| format!("Card {}", n))
			.find(|name| !self.tmpls.iter().any(|t| &t.name == name))
			.unwrap_or_default()
	}

	/// Sets every template's ordinal to its position.
	pub fn update_template_ords(&mut self) {
		for (ord, template) in self.tmpls.iter_mut().enumerate() {
			template.ord = ord;
		}
	}
}

impl Template {
	pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), ..Default::default() } }

	/// Swaps the question and answer sides, so a copy of a single template
	/// becomes its reverse card.
	pub fn flip_question_answer(&mut self) {
		let question = std::mem::take(&mut self.qfmt);

		self.qfmt = match split_at_answer(&self.afmt) {
			Some(back) => back.trim().to_string(),
			None => self.afmt.replace(FRONT_SIDE, ""),
		};
		self.afmt = format!("{}\n\n{}\n\n{}", FRONT_SIDE, ANSWER_MARKER, question);
	}
}

// The text after the last answer marker that has something on both sides
fn split_at_answer(afmt: &str) -> Option<&str> {
	afmt.rmatch_indices(ANSWER_MARKER).find_map(|(idx, _)| {
		let back = &afmt[idx + ANSWER_MARKER.len()..];
		(idx > 0 && !back.is_empty()).then_some(back)
	})
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::types::model::NoteModelType;

	fn model_with(names: &[&str]) -> NoteModel {
		NoteModel {
			id:         1,
			name:       "Basic".into(),
			kind:       NoteModelType::Standard,
			modified:   0,
			flds:       Vec::new(),
			tmpls:      names.iter().map(|n| Template::new(*n)).collect(),
			css:        String::new(),
			sortf:      0,
			did:        None,
			latex_pre:  String::new(),
			latex_post: String::new(),
			tags:       Vec::new(),
			vers:       Vec::new(),
		}
	}

	#[test]
	fn new_card_name_skips_taken_names() {
		assert_eq!(model_with(&["Card 1"]).new_card_name(), "Card 2");
		assert_eq!(model_with(&["Card 1", "Card 3"]).new_card_name(), "Card 4");
		assert_eq!(model_with(&["Card 2", "Card 3"]).new_card_name(), "Card 4");
	}

	#[test]
	fn flip_uses_text_after_answer_marker() {
		let mut template = Template::new("Card 2");
		template.qfmt = "{{Front}}".into();
		template.afmt = "{{FrontSide}}\n\n<hr id=answer>\n\n{{Back}}".into();

		template.flip_question_answer();

		assert_eq!(template.qfmt, "{{Back}}");
		assert_eq!(template.afmt, "{{FrontSide}}\n\n<hr id=answer>\n\n{{Front}}");
	}

	#[test]
	fn flip_without_marker_drops_front_side() {
		let mut template = Template::new("Card 2");
		template.qfmt = "{{Front}}".into();
		template.afmt = "{{FrontSide}} {{Back}}".into();

		template.flip_question_answer();

		assert_eq!(template.qfmt, " {{Back}}");
		assert_eq!(template.afmt, "{{FrontSide}}\n\n<hr id=answer>\n\n{{Front}}");
	}

	#[test]
	fn update_template_ords_renumbers() {
		let mut model = model_with(&["a", "b", "c"]);
		model.tmpls.remove(0);
		model.update_template_ords();
		assert_eq!(model.tmpls.iter().map(|t| t.ord).collect::<Vec<_>>(), vec![0, 1]);
	}

	#[test]
	fn template_out_of_range() {
		let model = model_with(&["a"]);
		assert!(matches!(model.template(1), Err(EditorError::TemplateOutOfRange { ordinal: 1, len: 1 })));
	}
}
