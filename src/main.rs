use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use flash_templates::{Collection, EditorSession, config_loader, telemetry};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "flash-templates", version, about = "Edit the card templates of a note type")]
struct Cli {
	/// Configuration file, defaults to the platform config directory
	#[arg(long)]
	config: Option<PathBuf>,

	/// Collection file, overrides the configuration
	#[arg(long)]
	collection: Option<PathBuf>,

	/// Directory for pending edits, overrides the configuration
	#[arg(long)]
	cache_dir: Option<PathBuf>,

	/// Id of the note type to edit
	#[arg(long, short)]
	model: i64,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// List the templates of the edited note type
	List,
	/// Print the front, back and styling of a template
	Show { ord: usize },
	/// Replace the front and/or back of a template
	Edit {
		ord:   usize,
		#[arg(long)]
		front: Option<String>,
		#[arg(long)]
		back:  Option<String>,
	},
	/// Replace the styling shared by all templates
	Css { css: String },
	/// Add a template based on an existing one
	Add {
		#[arg(long, default_value_t = 0)]
		from: usize,
	},
	/// Delete a template
	Delete { ord: usize },
	/// Print the pending template adds and deletes
	Changes,
	/// Write the edited note type out for a previewer
	Preview,
	/// Report whether there are unsaved edits
	Status,
	/// Save the edits to the collection
	Commit,
	/// Throw the edits away
	Discard,
}

fn main() -> Result<()> {
	color_eyre::install()?;
	let cli = Cli::parse();

	let mut config = config_loader::load_config(cli.config.as_deref()).wrap_err("Failed to load configuration")?;
	if let Some(collection) = cli.collection {
		config.collection = collection;
	}
	if let Some(cache_dir) = cli.cache_dir {
		config.cache_dir = Some(cache_dir);
	}

	let _telemetry = telemetry::init(&config.log);
	let cache_dir = config.resolved_cache_dir();

	let mut collection = Collection::open(&config.collection)
		.wrap_err_with(|| format!("Failed to open collection {:?}", config.collection))?;
	let mut session = EditorSession::resume_or_open(&collection, &cache_dir, cli.model)?;

	match cli.command {
		Command::List => {
			let model = session.edited_model();
			println!("{} ({} templates)", model.name, model.tmpls.len());
			for template in &model.tmpls {
				println!("  {}: {}", template.ord, template.name);
			}
			return Ok(());
		}

		Command::Show { ord } => {
			let template = session.edited_model().template(ord)?;
			println!("== {} ==", template.name);
			println!("-- Front --\n{}", template.qfmt);
			println!("-- Back --\n{}", template.afmt);
			println!("-- Styling --\n{}", session.edited_model().css);
			return Ok(());
		}

		Command::Edit { ord, front, back } => {
			if let Some(front) = front {
				session.set_front(ord, front)?;
			}
			if let Some(back) = back {
				session.set_back(ord, back)?;
			}
		}

		Command::Css { css } => session.set_css(css),

		Command::Add { from } => {
			let ord = session.add_template(from)?;
			println!("Added '{}' at {}", session.edited_model().tmpls[ord].name, ord);
		}

		Command::Delete { ord } => {
			let name = session.edited_model().template(ord)?.name.clone();
			let cards = session
				.persisted_ordinal(&collection, ord)?
				.map(|stored| collection.template_use_count(cli.model, stored))
				.unwrap_or(0);

			session.delete_template(&collection, ord)?;
			println!("Deleted the '{}' card type and its {} cards", name, cards);
		}

		Command::Changes => {
			for change in session.template_changes() {
				println!("{}", change);
			}
			return Ok(());
		}

		Command::Preview => {
			match session.export_for_preview(&collection, &cache_dir)? {
				Some(path) => println!("{}", path.display()),
				None => println!("Note type unchanged, preview the stored one"),
			}
			return Ok(());
		}

		Command::Status => {
			let changed = session.model_has_changed(&collection)?;
			println!("{}", if changed { "Unsaved changes" } else { "No changes" });
			if !session.template_changes().is_empty() {
				println!("{} pending template changes, saving will require a full sync", session.template_changes().len());
			}
			return Ok(());
		}

		Command::Commit => {
			if session.commit(&mut collection, &cache_dir).wrap_err("Failed to save note type")? {
				println!("Saved");
			} else {
				println!("Nothing to save");
			}
			return Ok(());
		}

		Command::Discard => {
			session.discard(&cache_dir)?;
			println!("Discarded unsaved changes");
			return Ok(());
		}
	}

	let state = session.save_state(&collection, &cache_dir)?;
	info!("Session state saved to {:?}", state);
	Ok(())
}
