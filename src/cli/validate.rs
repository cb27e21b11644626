use std::path::Path;

use clap::Parser;
use registry::domain::validation::InvalidRecord;
use tracing::instrument;

use super::{open_registry, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Check every stored record against the validation rules")]
pub struct Validate {
    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let registry = open_registry(root);
        let problems = registry.audit();

        if problems.is_empty() {
            if !self.quiet {
                println!(
                    "{}",
                    format!("✅ All {} records are valid", registry.count()).success()
                );
            }
            return Ok(());
        }

        for problem in &problems {
            let name = registry.get(problem.index).map_or("", |record| record.name());
            eprintln!("{}", describe(problem, name));
        }

        anyhow::bail!(
            "{} of {} records failed validation",
            problems.len(),
            registry.count()
        )
    }
}

fn describe(problem: &InvalidRecord, name: &str) -> String {
    let mut out = format!(
        "{} {name} (id {})",
        format!("#{}", problem.index).warning(),
        problem.id
    );
    for error in problem.errors.iter() {
        out.push_str(&format!("\n  • {}: {error}", error.field()));
    }
    out
}
