pub mod list;
pub mod pack;
pub mod verify;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Pack a directory of structure files into an archive
    Pack(pack::PackArgs),
    /// Check that an archive reads back completely
    Verify(verify::VerifyArgs),
    /// List the structures stored in an archive
    List(list::ListArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Pack(pack) => pack.handle(),
            Commands::Verify(verify) => verify.handle(),
            Commands::List(list) => list.handle(),
        }
    }
}
