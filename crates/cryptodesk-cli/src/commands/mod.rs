mod market;
mod news;
mod providers;
mod social;

use cryptodesk_core::{AppConfig, WrapperContext};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Configuration and wrapper context shared by every command.
pub struct Session {
    pub config: AppConfig,
    pub context: WrapperContext,
}

impl Session {
    pub fn load(cli: &Cli) -> Result<Self, CliError> {
        let config = match &cli.config {
            Some(path) => AppConfig::from_path(path)?,
            None => AppConfig::default(),
        };
        let context = WrapperContext::from_env(config.api.currency.as_str());
        debug!(
            config_file = ?cli.config,
            retry_attempts = config.api.retry_attempts,
            retry_delay_seconds = config.api.retry_delay_seconds,
            currency = %config.api.currency,
            "session loaded"
        );
        Ok(Self { config, context })
    }
}

pub fn run(cli: &Cli) -> Result<Value, CliError> {
    let session = Session::load(cli)?;

    match &cli.command {
        Command::Price(args) => market::price(args, &session),
        Command::History(args) => market::history(args, &session),
        Command::Headlines(args) => news::headlines(args, &session),
        Command::News(args) => news::search(args, &session),
        Command::Posts(args) => social::posts(args, &session),
        Command::Providers => providers::run(&session),
    }
}
