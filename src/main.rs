//! Binary entry point for the `drape` CLI.

use clap::Parser;
use env_logger::Env;

use drape::cli::{execute_drape, execute_plot, Cli, Command};
use drape::config::Config;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Command::Drape(args) => args.verbose,
        Command::Plot(args) => args.verbose,
    };
    let env = if verbose {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("info")
    };
    env_logger::Builder::from_env(env).init();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from("drape.toml"));
    let config = Config::load(&config_path)?;

    match cli.command {
        Command::Drape(args) => execute_drape(args, &config)?,
        Command::Plot(args) => execute_plot(args)?,
    }

    Ok(())
}
