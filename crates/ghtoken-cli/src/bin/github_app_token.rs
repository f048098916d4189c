//! Print a GitHub App installation access token to stdout.

use clap::Parser;
use ghtoken_cli::{init_tracing, run, Args};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let token = run(&args, |name| std::env::var(name).ok())?;
    println!("{}", token);
    Ok(())
}
