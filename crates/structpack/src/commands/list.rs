use clap::Args;
use itertools::Itertools;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use pnx_archive::ArchiveReader;
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// An archive to list
    #[arg(short, long, value_name = "FILE")]
    pub file: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let root = ArchiveReader::open(&self.file)
            .context(format!("reading {}", self.file.display()))?;

        let structures = root.structures();
        let width = structures
            .iter()
            .map(|(path, _)| path.len())
            .max()
            .unwrap_or_default();

        for (path, structure) in structures.iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
            let [x, y, z] = structure.size;
            let states = if structure.overflows() {
                structure.palette.len().red().to_string()
            } else {
                structure.palette.len().to_string()
            };

            println!(
                "{:width$}  {}x{}x{}  {} states",
                path.bold(),
                x,
                y,
                z,
                states,
                width = width
            );
        }

        println!("{} structures", structures.len());
        Ok(())
    }
}
