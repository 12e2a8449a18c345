use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cloudledger")]
#[command(about = "Read exported ledger batches from object storage", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $CLOUDLEDGER_CONFIG or config/cloudledger.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Server(ServerArgs),
    /// Print the most recent ledger sequence in storage
    Latest,
    /// Fetch one ledger's close metadata
    Get(GetArgs),
    /// Print the object key holding a ledger
    Key(KeyArgs),
    /// Check that both ends of a range are available
    Prepare(PrepareArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to (overrides server.bind_addr)
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    pub sequence: u32,

    /// Write the raw record here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct KeyArgs {
    pub sequence: u32,
}

#[derive(clap::Args, Debug)]
pub struct PrepareArgs {
    pub from: u32,

    /// Last ledger of the range; omitted means unbounded
    #[arg(long)]
    pub to: Option<u32>,
}
