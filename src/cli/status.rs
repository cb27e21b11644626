use std::{path::Path, process};

use clap::Parser;
use tracing::instrument;

use super::{
    open_registry,
    terminal::{is_narrow, Colorize},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show the number of registered students")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Print a single `key=value` line for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let registry = open_registry(root);

        let total = registry.count();
        let invalid = registry.audit().len();

        print!("{}", self.render(total, invalid, is_narrow())?);

        // Exit with a non-zero code when stored data needs attention.
        if invalid > 0 {
            process::exit(2);
        }
        Ok(())
    }

    fn render(&self, total: usize, invalid: usize, narrow: bool) -> anyhow::Result<String> {
        Ok(match self.output {
            OutputFormat::Json => Self::output_json(total, invalid)?,
            OutputFormat::Table if self.quiet => format!("total={total} invalid={invalid}\n"),
            OutputFormat::Table if total == 0 => {
                "No students registered yet. Add one with 'students add'.\n".to_string()
            }
            OutputFormat::Table => Self::output_table(total, invalid, narrow),
        })
    }

    fn output_json(total: usize, invalid: usize) -> anyhow::Result<String> {
        let output = serde_json::json!({
            "total": total,
            "invalid": invalid,
        });
        Ok(format!("{}\n", serde_json::to_string_pretty(&output)?))
    }

    fn output_table(total: usize, invalid: usize, narrow: bool) -> String {
        let mut out = String::new();
        if narrow {
            out.push_str(&format!("Students: {total}\n"));
        } else {
            out.push_str("Registered students\n");
            out.push_str(&format!("{}\n", "───────────────────".dim()));
            out.push_str(&format!("Total: {}\n", total.to_string().info()));
        }

        out.push('\n');

        if invalid == 0 {
            out.push_str(&format!("Invalid records: {} ✅\n", "0".success()));
        } else {
            out.push_str(&format!(
                "Invalid records: {} ⚠️\n",
                invalid.to_string().warning()
            ));
            out.push_str(&format!(
                "{}\n",
                "Run 'students validate' to see what is wrong.".dim()
            ));
        }
        out
    }
}
