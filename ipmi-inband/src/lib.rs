//! Converge BMC network settings and local IPMI users through the in-band
//! `ipmitool` interface.
//!
//! Two actions are provided, both following the same shape: read the live
//! device state, compare it with the desired state, and issue only the
//! `ipmitool` invocations needed to close the gap.
//!
//! - [`action::run_lan_action`] sets a LAN channel's address source, IP,
//!   netmask, gateway and VLAN ([`lan`]).
//! - [`action::run_user_action`] creates, configures or removes a user
//!   ([`users`]).
//!
//! Every invocation goes through [`runner::IpmiTool`], which prefixes the
//! configured elevation command and suppresses mutating subcommands in check
//! mode. Text parsing lives in `bmc-state-core`.
//!
//! # Examples
//!
//! ```ignore
//! use ipmi_inband::action::run_lan_action;
//! use ipmi_inband::config::ToolConfig;
//! use ipmi_inband::params::{LanParams, RawLanArgs};
//! use ipmi_inband::runner::{IpmiTool, SystemRunner};
//!
//! let params = LanParams::try_from(raw_args)?;
//! let tool = IpmiTool::new(SystemRunner, &ToolConfig::default(), true);
//! let result = run_lan_action(tool, &params, true)?;
//! println!("changed={}", result.changed);
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod lan;
pub mod outcome;
pub mod params;
pub mod report;
pub mod runner;
pub mod users;

pub use error::IpmiError;
