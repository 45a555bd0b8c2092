use askgpt::{
    cli::{Args, Commands},
    session::{run_ask, run_history},
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    // stdout carries the answer, diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() {
    init_logging();
    let args = Args::parse();
    let res = match args.command {
        Commands::Ask { prompt, options } => run_ask(prompt, options),
        Commands::History { log, limit } => run_history(log, limit),
    };
    res.unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });
}
