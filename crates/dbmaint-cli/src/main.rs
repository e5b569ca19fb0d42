//! dbmaint command-line tool
//!
//! Runs versioned maintenance scripts against a database, recording each
//! execution in a local history so every script version is applied once.

mod args;
mod commands;
mod formatter;

use args::Args;
use clap::Parser;

fn main() {
    // Logs go to stderr so rendered output stays parseable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dbmaint=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let formatter = formatter::create_formatter(args.format);

    match commands::run(&args, &*formatter) {
        Ok(output) => {
            println!("{}", output.rendered);
            if !output.success {
                std::process::exit(1);
            }
        }
        Err(e) => {
            if let Some(partial) = e.partial_output() {
                println!("{}", partial);
            }
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
