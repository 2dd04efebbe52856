use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "ipmi-inband")]
#[command(about = "Converge BMC LAN settings and IPMI users through in-band ipmitool")]
pub struct Cli {
    /// Tool configuration file (TOML). Defaults to the embedded configuration.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Path to the ipmitool binary.
    #[arg(long, global = true)]
    pub ipmitool: Option<String>,
    /// Run ipmitool without the elevation prefix.
    #[arg(long, global = true)]
    pub no_elevate: bool,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Converge a LAN channel's network configuration.
    Lan(LanArgs),
    /// Create, configure or remove a local IPMI user.
    User(UserArgs),
    /// Print a LAN channel's current configuration.
    ShowLan(ShowArgs),
    /// Print a channel's user table and free slots.
    ShowUsers(ShowArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Report what would change without changing anything.
    #[arg(long)]
    pub check: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// JSON file holding the action parameters. Flags override its values.
    #[arg(long)]
    pub args: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct LanArgs {
    #[arg(long)]
    pub channel: Option<u8>,
    #[arg(long)]
    pub ip: Option<String>,
    #[arg(long)]
    pub netmask: Option<String>,
    #[arg(long)]
    pub gateway: Option<String>,
    /// VLAN id, or `none` to disable tagging.
    #[arg(long)]
    pub vlan: Option<String>,
    /// Use DHCP (`yes`) or a static address (`no`).
    #[arg(long)]
    pub dhcp: Option<String>,
    /// Include the before/after diff in the result.
    #[arg(long)]
    pub diff: bool,
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser, Debug)]
pub struct UserArgs {
    #[arg(long)]
    pub channel: Option<u8>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long, env = "IPMI_INBAND_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Privilege level name (e.g. administrator) or number.
    #[arg(long)]
    pub privileges: Option<String>,
    /// `present` or `absent`.
    #[arg(long)]
    pub state: Option<String>,
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    #[arg(long)]
    pub channel: Option<u8>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
