//! `students`: register, edit, search and delete student records from the
//! command line.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
