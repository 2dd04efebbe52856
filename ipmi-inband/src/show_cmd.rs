use anyhow::{Context, Result};
use bmc_state_core::{format_json, format_lan_text, format_users_text};
use ipmi_inband::config::ToolConfig;
use ipmi_inband::lan::LanChannel;
use ipmi_inband::params::validate_channel;
use ipmi_inband::users::IpmiUsers;

use crate::cli::{OutputFormat, ShowArgs};

pub fn run_show_lan(args: ShowArgs, config: &ToolConfig) -> Result<()> {
    let number = validate_channel(args.channel)?;
    let mut channel = LanChannel::new(crate::tool(config, true), number);
    let attrs = channel
        .load()
        .with_context(|| format!("failed to read LAN channel {number}"))?;

    match args.format {
        OutputFormat::Text => println!("{}", format_lan_text(attrs)),
        OutputFormat::Json => println!("{}", format_json(attrs)),
    }
    Ok(())
}

pub fn run_show_users(args: ShowArgs, config: &ToolConfig) -> Result<()> {
    let channel = validate_channel(args.channel)?;
    let mut users = IpmiUsers::new(crate::tool(config, true), channel);
    let table = users
        .load()
        .with_context(|| format!("failed to read users of channel {channel}"))?;

    match args.format {
        OutputFormat::Text => println!("{}", format_users_text(table)),
        OutputFormat::Json => println!("{}", format_json(table)),
    }
    Ok(())
}
