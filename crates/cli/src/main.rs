use std::process::ExitCode;

use clap::Parser;

use maxperm_authorizer::AuthorizerConfig;
use maxperm_cli::{Args, check};

fn main() -> anyhow::Result<ExitCode> {
    maxperm_observability::init();

    let args = Args::parse();
    let config = AuthorizerConfig::from_env();

    let report = check(&args, &config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if report.allowed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}
