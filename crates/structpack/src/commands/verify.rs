use clap::Args;
use miette::{miette, Result};
use owo_colors::OwoColorize;
use pnx_archive::{verify::verify, VerifyOutcome};
use std::path::PathBuf;

#[derive(Args)]
pub struct VerifyArgs {
    /// An archive to check
    #[arg(short, long, value_name = "FILE")]
    pub file: PathBuf,
}

impl VerifyArgs {
    pub fn handle(&self) -> Result<()> {
        let outcome = verify(&self.file);

        match &outcome {
            VerifyOutcome::Verified { .. } => println!("{} {}", "✓".green(), outcome),
            VerifyOutcome::Empty { .. } => println!("{} {}", "!".yellow(), outcome),
            VerifyOutcome::Truncated { .. } | VerifyOutcome::Unreadable { .. } => {
                println!("{} {}", "✗".red(), outcome)
            }
        }

        if outcome.is_fatal() {
            return Err(miette!("{} did not verify", self.file.display()));
        }
        Ok(())
    }
}
