use anyhow::Context;
use clap::Parser;
use cli::{Cli, GlobalArgs, LogLevel};
use config::AdjusterConfig;
use env_logger::Target;
use log::LevelFilter;

mod cli;
mod commands;
mod config;
mod operations;
mod output;
mod volcengine;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    configure_logging(&cli.global_args);

    let config = AdjusterConfig::from_env(&cli.global_args)
        .context("Couldn't resolve the configuration!")?;

    commands::reconcile::reconcile(config, cli.output).await
}

fn configure_logging(global_args: &GlobalArgs) {
    let log_level = global_args.get_log_level();
    let mut logger = env_logger::builder();

    logger
        .format_timestamp(None)
        .format_module_path(matches!(log_level, LogLevel::Trace))
        .format_target(false)
        .format_level(false)
        .target(Target::Stderr);

    if let LogLevel::Normal = log_level {
        logger.filter(Some("snat_adjuster"), LevelFilter::Info);
    }

    if let LogLevel::Verbose = log_level {
        logger.filter(Some("snat_adjuster"), LevelFilter::Debug);
    }

    if let LogLevel::Trace = log_level {
        logger.filter(None, LevelFilter::Trace);
    }

    logger.init();
}
