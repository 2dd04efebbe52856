use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ipmi_inband::config::ToolConfig;
use ipmi_inband::outcome::ActionResult;
use ipmi_inband::report::render_result;
use ipmi_inband::runner::{IpmiTool, SystemRunner};
use tracing_subscriber::EnvFilter;

mod cli;
mod lan_cmd;
mod show_cmd;
mod user_cmd;

use cli::{Cli, Command, OutputFormat};

/// Exit code when the action ran but reported a failure in its result.
const EXIT_REPORTED_FAILURE: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = resolve_config(&cli)?;

    match cli.command {
        Command::Lan(args) => lan_cmd::run_lan(args, &config),
        Command::User(args) => user_cmd::run_user(args, &config),
        Command::ShowLan(args) => show_cmd::run_show_lan(args, &config).map(|()| ExitCode::SUCCESS),
        Command::ShowUsers(args) => {
            show_cmd::run_show_users(args, &config).map(|()| ExitCode::SUCCESS)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<ToolConfig> {
    let mut config = match &cli.config {
        Some(path) => ToolConfig::load(path)
            .with_context(|| format!("failed to load tool config {}", path.display()))?,
        None => ToolConfig::default(),
    };
    if let Some(ipmitool) = &cli.ipmitool {
        config.ipmitool = ipmitool.clone();
    }
    if cli.no_elevate {
        config.elevate.clear();
    }
    Ok(config)
}

pub(crate) fn tool(config: &ToolConfig, check_mode: bool) -> IpmiTool<SystemRunner> {
    IpmiTool::new(SystemRunner, config, check_mode)
}

/// Print `result` and map it to the process exit code.
pub(crate) fn emit_result(result: &ActionResult, format: OutputFormat) -> Result<ExitCode> {
    match format {
        OutputFormat::Text => println!("{}", render_result(result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
    }
    Ok(if result.failed {
        ExitCode::from(EXIT_REPORTED_FAILURE)
    } else {
        ExitCode::SUCCESS
    })
}
