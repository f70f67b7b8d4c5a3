use clap::{Args, Parser, Subcommand};
use ems_routing::error::AppError;

use crate::demo::{run_demo, run_export, DemoArgs, ExportArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Emergency Routing Service",
    about = "Rank and reserve emergency hospitals for triaged patients",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a CLI walkthrough of a triage case against bundled demo data
    Demo(DemoArgs),
    /// Export ranked candidates for a triage case as CSV
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Export(args) => run_export(args),
    }
}
