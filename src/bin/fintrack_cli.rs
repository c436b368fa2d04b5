use clap::Parser;
use fintrack_core::{
    cli::{run_cli, CliArgs},
    init,
};

fn main() {
    init();

    let args = CliArgs::parse();
    if let Err(err) = run_cli(args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
