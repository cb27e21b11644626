use std::path::Path;

use registry::{domain::validation, Command, Field, Outcome, StudentDraft, UniqueCheck};
use tracing::instrument;

use crate::cli::{ensure_saved, list, open_registry, prompt_field, report_failure, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// The student's full name (letters and spaces only)
    #[arg(long, short)]
    name: Option<String>,

    /// The student number (digits only, at least 3)
    #[arg(long, short = 'i')]
    student_id: Option<String>,

    /// The student's email address
    #[arg(long, short)]
    email: Option<String>,

    /// The student's contact number (digits only, at least 10)
    #[arg(long, short)]
    contact: Option<String>,
}

impl Add {
    #[instrument(skip_all)]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut registry = open_registry(root);

        let name = match self.name {
            Some(name) => name,
            None => prompt_field(Field::Name, None, |value| {
                validation::validate_name(value).map_err(|e| e.to_string())
            })?,
        };
        let student_id = match self.student_id {
            Some(student_id) => student_id,
            None => prompt_field(Field::StudentId, None, |value| {
                registry
                    .check_student_id(value, UniqueCheck::New)
                    .map_err(|e| e.to_string())
            })?,
        };
        let email = match self.email {
            Some(email) => email,
            None => prompt_field(Field::Email, None, |value| {
                validation::validate_email(value).map_err(|e| e.to_string())
            })?,
        };
        let contact = match self.contact {
            Some(contact) => contact,
            None => prompt_field(Field::Contact, None, |value| {
                validation::validate_contact(value).map_err(|e| e.to_string())
            })?,
        };

        let draft = StudentDraft::new(name, student_id, email, contact);
        let outcome = registry
            .dispatch(Command::Submit(draft), |_| false)
            .inspect_err(report_failure)
            .map_err(|_| anyhow::anyhow!("Student was not registered"))?;
        ensure_saved(&mut registry)?;

        if let Outcome::Added { index, .. } = outcome {
            println!(
                "{}",
                format!("✅ Student registered successfully at position {index}").success()
            );
        }
        println!();
        list::render_all(&registry, list::OutputFormat::Table)
    }
}
