//! FluSight CLI - prepares dashboard data files from the Delphi Epidata API.

use clap::Parser;
use log::error;

#[derive(Parser)]
#[command(
    name = "flu-cli",
    version,
    about = "FluSight dashboard data toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: flu_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let result = flu_cmd::run(cli.command).await;
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
