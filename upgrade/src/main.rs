mod artifact;
mod command_line;
mod constants;
mod contracts;
mod errors;
mod runner;
mod upgrade;
mod utils;

use anyhow::Result;
use clap::Parser;
use command_line::CommandLine;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cmd = CommandLine::parse();
    cmd.execute().await
}
