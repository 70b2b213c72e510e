use clap::Parser;
use candlechart::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
