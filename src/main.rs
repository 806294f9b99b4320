mod app;
mod binning;
mod color;
mod data;
mod envcheck;
mod error;
mod render;
mod stats;
mod style;

use clap::Parser;

use app::Cli;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    app::run(cli)
}
