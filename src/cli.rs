use std::path::{Path, PathBuf};

mod add;
mod delete;
mod edit;
mod list;
mod status;
mod terminal;
mod validate;

use add::Add;
use clap::ArgAction;
use delete::Delete;
use edit::Edit;
use list::{List, Search};
use registry::{
    Config, Field, FileStore, JsonSnapshot, Registry, RegistryError, StudentDraft,
};
use status::Status;
use terminal::Colorize;
use tracing::instrument;
use validate::Validate;

/// The registry type every command works against.
type FileRegistry = Registry<JsonSnapshot<FileStore>>;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory the student records are stored in
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show how many students are registered (default)
    Status(Status),

    /// Initialize a new student registry
    Init,

    /// Register a new student
    ///
    /// Any field not given on the command line is asked for interactively.
    Add(Add),

    /// Edit the student at a position in the list
    Edit(Edit),

    /// Delete the student at a position in the list
    Delete(Delete),

    /// List all registered students
    List(List),

    /// Search students by name, student ID, email or contact number
    Search(Search),

    /// Check every stored record against the validation rules
    Validate(Validate),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(&root)?,
            Self::Init => init(&root)?,
            Self::Add(command) => command.run(&root)?,
            Self::Edit(command) => command.run(&root)?,
            Self::Delete(command) => command.run(&root)?,
            Self::List(command) => command.run(&root)?,
            Self::Search(command) => command.run(&root)?,
            Self::Validate(command) => command.run(&root)?,
        }
        Ok(())
    }
}

/// Creates the configuration file for a new registry under `root`.
#[instrument]
fn init(root: &Path) -> anyhow::Result<()> {
    let config_path = root.join(Config::FILE_NAME);
    if config_path.exists() {
        anyhow::bail!(
            "Registry already initialized (found existing {})",
            Config::FILE_NAME
        );
    }

    std::fs::create_dir_all(root)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;

    let config = Config::default();
    config
        .save(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", Config::FILE_NAME))?;

    println!("Initialized student registry in {}", root.display());
    println!("  Created: {}", Config::FILE_NAME);
    println!(
        "  Records will be stored in: {}.json",
        config.storage_key()
    );
    println!();
    println!("Next steps:");
    println!("  students add --name \"Ada Lovelace\" --student-id 1001");

    Ok(())
}

/// Opens the registry stored under `root`, using its configuration file if
/// there is one.
fn open_registry(root: &Path) -> FileRegistry {
    let config = Config::load_or_default(root);
    let store = FileStore::new(root.to_path_buf());
    Registry::open(JsonSnapshot::from_config(store, &config))
}

/// Makes sure the last mutation reached disk.
///
/// The registry keeps failed saves in memory, but this process is about to
/// exit, so a failed save here means the change is lost.
fn ensure_saved(registry: &mut FileRegistry) -> anyhow::Result<()> {
    if registry.has_unsaved_changes() {
        registry
            .flush()
            .map_err(|e| anyhow::anyhow!("Failed to save student records: {e}"))?;
    }
    Ok(())
}

/// Asks for a field value until it passes `validate`.
fn prompt_field<V>(field: Field, initial: Option<&str>, mut validate: V) -> anyhow::Result<String>
where
    V: FnMut(&str) -> Result<(), String>,
{
    let mut input = dialoguer::Input::<String>::new()
        .with_prompt(field.label())
        .validate_with(move |value: &String| validate(value.trim()));
    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }
    Ok(input.interact_text()?.trim().to_string())
}

/// Reports a failed mutation, one line per failing field.
fn report_failure(error: &RegistryError) {
    match error {
        RegistryError::Invalid(errors) => {
            for error in errors.iter() {
                eprintln!("  {} {error}", "✗".warning());
            }
        }
        RegistryError::IndexOutOfRange { .. } | RegistryError::IdsExhausted => {
            eprintln!("{}", error.to_string().warning());
        }
    }
}

/// Overrides the fields of `base` that were given on the command line.
fn merge_draft(
    base: StudentDraft,
    name: Option<String>,
    student_id: Option<String>,
    email: Option<String>,
    contact: Option<String>,
) -> StudentDraft {
    StudentDraft::new(
        name.unwrap_or(base.name),
        student_id.unwrap_or(base.student_id),
        email.unwrap_or(base.email),
        contact.unwrap_or(base.contact),
    )
}
