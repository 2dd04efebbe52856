use std::process::ExitCode;

use anyhow::{Context, Result};
use ipmi_inband::action::run_user_action;
use ipmi_inband::config::ToolConfig;
use ipmi_inband::params::{load_args, RawUserArgs, UserParams};
use serde_json::Value;

use crate::cli::UserArgs;

pub fn run_user(args: UserArgs, config: &ToolConfig) -> Result<ExitCode> {
    let mut raw: RawUserArgs = match &args.run.args {
        Some(path) => load_args(path)?,
        None => RawUserArgs::default(),
    };
    merge_flags(&mut raw, &args);

    let params = UserParams::try_from(raw).context("invalid user parameters")?;
    let tool = crate::tool(config, args.run.check);
    let result = run_user_action(tool, &params)
        .with_context(|| format!("failed to configure user '{}'", params.user))?;

    crate::emit_result(&result, args.run.format)
}

fn merge_flags(raw: &mut RawUserArgs, args: &UserArgs) {
    if args.channel.is_some() {
        raw.channel = args.channel;
    }
    if args.user.is_some() {
        raw.user = args.user.clone();
    }
    if args.password.is_some() {
        raw.password = args.password.clone();
    }
    if let Some(privileges) = &args.privileges {
        raw.privileges = Some(Value::String(privileges.clone()));
    }
    if args.state.is_some() {
        raw.state = args.state.clone();
    }
}
