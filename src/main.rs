mod app;
mod camera;
mod canvas;
mod config;
mod draw;
mod logging;
mod model;
mod render;
mod sim;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = config::Args::parse();
    logging::init_logging();
    app::run(args)
}
