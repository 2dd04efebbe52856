use std::process::ExitCode;

use anyhow::{Context, Result};
use ipmi_inband::action::run_lan_action;
use ipmi_inband::config::ToolConfig;
use ipmi_inband::params::{load_args, LanParams, RawLanArgs};
use serde_json::Value;

use crate::cli::LanArgs;

pub fn run_lan(args: LanArgs, config: &ToolConfig) -> Result<ExitCode> {
    let mut raw: RawLanArgs = match &args.run.args {
        Some(path) => load_args(path)?,
        None => RawLanArgs::default(),
    };
    merge_flags(&mut raw, &args);

    let params = LanParams::try_from(raw).context("invalid LAN parameters")?;
    let tool = crate::tool(config, args.run.check);
    let result = run_lan_action(tool, &params, args.diff)
        .with_context(|| format!("failed to configure LAN channel {}", params.channel))?;

    crate::emit_result(&result, args.run.format)
}

fn merge_flags(raw: &mut RawLanArgs, args: &LanArgs) {
    if args.channel.is_some() {
        raw.channel = args.channel;
    }
    let flags = [
        ("ip", &args.ip),
        ("netmask", &args.netmask),
        ("gateway", &args.gateway),
        ("vlan", &args.vlan),
        ("dhcp", &args.dhcp),
    ];
    for (key, value) in flags {
        if let Some(value) = value {
            raw.config
                .insert(key.to_string(), Value::String(value.clone()));
        }
    }
}
