use clap::Args;
use miette::{miette, Context, Result};
use owo_colors::OwoColorize;
use pnx_archive::{
    aggregate::{FailurePolicy, DEFAULT_EXTENSION},
    encode::OverflowPolicy,
    pack,
    write::{ArchiveWriterOptions, DEFAULT_ARCHIVE_NAME},
    BlockStateRegistry, PackOptions,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args)]
pub struct PackArgs {
    /// An input directory of structure files
    #[arg(short, long, value_name = "DIR")]
    pub directory: PathBuf,

    /// A target archive
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_ARCHIVE_NAME)]
    pub file: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// A JSON file mapping java block states to bedrock block states
    #[arg(short, long, value_name = "FILE", env = "STRUCTPACK_MAPPINGS")]
    pub mappings: Option<PathBuf>,

    /// Extension of the structure files to pack
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Stop at the first structure file that fails to encode
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Refuse structures with more than 127 distinct block states
    #[arg(long, default_value_t = false)]
    pub reject_overflow: bool,

    /// Gzip compression level
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: u32,

    /// Succeed even when the written archive does not read back
    #[arg(long, default_value_t = false)]
    pub allow_unverified: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        let registry = BlockStateRegistry::init(self.mappings.as_deref())
            .context("loading block state mappings")?;

        let options = PackOptions::builder()
            .extension(self.extension.trim_start_matches('.'))
            .overflow(if self.reject_overflow {
                OverflowPolicy::Reject
            } else {
                OverflowPolicy::Warn
            })
            .failure(if self.strict {
                FailurePolicy::Abort
            } else {
                FailurePolicy::Skip
            })
            .build();

        let writer_options = ArchiveWriterOptions::builder()
            .level(self.level)
            .overwrite(self.overwrite)
            .build();

        info!("creating {}", self.file.display());
        let report = pack(
            &self.directory,
            &self.file,
            &registry,
            &options,
            writer_options,
        )
        .context(format!("packing {}", self.directory.display()))?;

        let stats = report.stats;
        println!(
            "packed {} structures into {} ({} bytes)",
            stats.structures.bold(),
            self.file.display(),
            report.bytes
        );
        if stats.skipped > 0 || stats.failed > 0 {
            println!(
                "{} skipped, {} failed",
                stats.skipped.yellow(),
                stats.failed.red()
            );
        }
        if stats.overflowed > 0 {
            warn!(
                "{} structures have more than 127 block states and wrap around",
                stats.overflowed
            );
        }

        if report.verification.is_success() {
            println!("{} {}", "✓".green(), report.verification);
            return Ok(());
        }

        println!("{} {}", "✗".red(), report.verification);
        if self.allow_unverified {
            warn!("keeping {} even though it did not verify", self.file.display());
            Ok(())
        } else {
            Err(miette!(
                "{} did not verify: {}",
                self.file.display(),
                report.verification
            ))
        }
    }
}
