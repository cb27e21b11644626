use std::path::Path;

use registry::{Command, Outcome, StudentRecord};
use tracing::instrument;

use crate::cli::{ensure_saved, open_registry, report_failure, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// Position of the student in the list (as shown by `list` or `search`)
    index: usize,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument(skip_all, fields(index = self.index))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut registry = open_registry(root);
        let skip_prompt = self.yes;

        let outcome = registry
            .dispatch(Command::Delete { index: self.index }, |record| {
                skip_prompt || confirm(record)
            })
            .inspect_err(report_failure)
            .map_err(|_| anyhow::anyhow!("Student record was not deleted"))?;
        ensure_saved(&mut registry)?;

        match outcome {
            Outcome::Deleted(record) => println!(
                "{}",
                format!("✅ Deleted the record for {}", record.name()).success()
            ),
            _ => println!("{}", "Cancelled".dim()),
        }
        Ok(())
    }
}

fn confirm(record: &StudentRecord) -> bool {
    dialoguer::Confirm::new()
        .with_prompt(format!(
            "Are you sure you want to delete the record for {}?",
            record.name()
        ))
        .default(false)
        .interact()
        .unwrap_or_else(|e| {
            tracing::debug!("Confirmation prompt failed, not deleting: {e}");
            false
        })
}
