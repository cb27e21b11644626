use std::path::Path;

use registry::{domain::validation, Command, Field, StudentDraft, UniqueCheck};
use tracing::instrument;

use crate::cli::{
    ensure_saved, merge_draft, open_registry, prompt_field, report_failure, terminal::Colorize,
};

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// Position of the student in the list (as shown by `list` or `search`)
    index: usize,

    /// New full name
    #[arg(long, short)]
    name: Option<String>,

    /// New student number
    #[arg(long, short = 'i')]
    student_id: Option<String>,

    /// New email address
    #[arg(long, short)]
    email: Option<String>,

    /// New contact number
    #[arg(long, short)]
    contact: Option<String>,
}

impl Edit {
    const fn has_fields(&self) -> bool {
        self.name.is_some()
            || self.student_id.is_some()
            || self.email.is_some()
            || self.contact.is_some()
    }

    #[instrument(skip_all, fields(index = self.index))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut registry = open_registry(root);
        let index = self.index;

        let Some(current) = registry.get(index).map(StudentDraft::from) else {
            anyhow::bail!(
                "No student at position {index} (there are {} students)",
                registry.count()
            );
        };

        let draft = if self.has_fields() {
            merge_draft(current, self.name, self.student_id, self.email, self.contact)
        } else {
            // Nothing given on the command line: edit every field, starting
            // from its current value.
            StudentDraft::new(
                prompt_field(Field::Name, Some(&current.name), |value| {
                    validation::validate_name(value).map_err(|e| e.to_string())
                })?,
                prompt_field(Field::StudentId, Some(&current.student_id), |value| {
                    registry
                        .check_student_id(value, UniqueCheck::Edit(index))
                        .map_err(|e| e.to_string())
                })?,
                prompt_field(Field::Email, Some(&current.email), |value| {
                    validation::validate_email(value).map_err(|e| e.to_string())
                })?,
                prompt_field(Field::Contact, Some(&current.contact), |value| {
                    validation::validate_contact(value).map_err(|e| e.to_string())
                })?,
            )
        };

        registry
            .dispatch(Command::Edit { index, draft }, |_| false)
            .inspect_err(report_failure)
            .map_err(|_| anyhow::anyhow!("Student record was not updated"))?;
        ensure_saved(&mut registry)?;

        println!("{}", "✅ Student record updated successfully!".success());
        Ok(())
    }
}
