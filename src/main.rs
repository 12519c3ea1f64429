mod bundle;
mod cli;
mod compile;
mod config;
mod coverage;
mod exec;
mod mutant;
mod out;
mod patch;
mod project;
mod report;
mod run_report;
mod source;
mod span;
mod stage;
mod testrun;
mod toolchain;
mod ui;
mod verify;

/// Entry point for the `mutvet` binary.
fn main() -> anyhow::Result<()> {
    cli::run()
}
