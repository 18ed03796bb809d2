use cu::pre::*;

use crate::config;

mod cmd_prepare;
mod cmd_map;

#[derive(clap::Parser, AsRef)]
pub struct CmdMain {
    /// TOML config file
    #[clap(short = 'C', long)]
    pub config: String,

    #[clap(subcommand)]
    #[as_ref(cu::cli::Flags)]
    pub cmd: CmdSubcommand,
}

#[derive(clap::Subcommand)]
pub enum CmdSubcommand {
    Prepare(CmdPrepare),
    Map(CmdMap),
}

impl AsRef<cu::cli::Flags> for CmdSubcommand {
    fn as_ref(&self) -> &cu::cli::Flags {
        match self {
            Self::Prepare(cmd) => cmd.as_ref(),
            Self::Map(cmd) => cmd.as_ref(),
        }
    }
}

pub fn main(args: CmdMain) -> cu::Result<()> {
    let config = config::load(args.config)?;

    match args.cmd {
        CmdSubcommand::Prepare(_) => cmd_prepare::run(config),
        CmdSubcommand::Map(_) => cmd_map::run(config),
    }
}

/// Preprocess the C context source for the upstream parser
#[derive(Debug, clap::Parser, AsRef)]
pub struct CmdPrepare {
    #[clap(flatten)]
    #[as_ref]
    pub common: cu::cli::Flags,
}

/// Build the type map from the parsed AST and dump it
#[derive(Debug, clap::Parser, AsRef)]
pub struct CmdMap {
    #[clap(flatten)]
    #[as_ref]
    pub common: cu::cli::Flags,
}
