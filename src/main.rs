mod codegen;
mod commands;
mod config;
mod model;
mod utils;

use std::error::Error;

use clap::*;
use commands::{Generate, Initialize};

#[derive(Parser)]
#[command(name = "query-stub", bin_name = "query-stub")]
enum Command {
    Generate(Generate),
    Init(Initialize),
}

fn main() -> Result<(), Box<dyn Error>> {
    let command = Command::parse();
    match command {
        Command::Generate(args) => args.generate(),
        Command::Init(args) => args.init(),
    }
}
