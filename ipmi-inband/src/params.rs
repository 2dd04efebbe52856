//! Validation of action parameters.
//!
//! Parameters arrive loosely typed, either from an args file or from CLI
//! flags, and are turned into [`LanParams`] or [`UserParams`] here. Anything
//! the reconcilers cannot act on is rejected with a [`ParamError`].

use std::collections::BTreeMap;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use bmc_state_core::LanAttribute;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::lan::{LanConfig, LanSetting, Vlan};

pub const DEFAULT_CHANNEL: u8 = 1;

/// Highest channel number addressable in IPMI.
const MAX_CHANNEL: u8 = 0xF;
/// Storage size of user names in the BMC user table.
const MAX_USER_NAME: usize = 16;
/// Storage size used for passwords (`user set password ... 20`).
const MAX_PASSWORD: usize = 20;

/// Errors raised when parameters fail validation.
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("failed to read args file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse args file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("channel {0} is out of range (0-15)")]
    InvalidChannel(u8),
    #[error("unknown LAN attribute '{0}' (expected ip, netmask, gateway, vlan or dhcp)")]
    UnknownAttribute(String),
    #[error("LAN attribute '{0}' is read-only")]
    ReadOnlyAttribute(LanAttribute),
    #[error("invalid value {value} for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("missing required parameter 'user'")]
    MissingUser,
    #[error("invalid user name '{name}': {reason}")]
    InvalidUser { name: String, reason: String },
    #[error("password is longer than {MAX_PASSWORD} bytes")]
    PasswordTooLong,
    #[error("invalid state '{0}' (expected present or absent)")]
    InvalidState(String),
}

/// LAN action parameters as they appear in an args file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLanArgs {
    pub channel: Option<u8>,
    #[serde(default)]
    pub config: BTreeMap<String, Value>,
}

/// User action parameters as they appear in an args file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawUserArgs {
    pub channel: Option<u8>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub privileges: Option<Value>,
    pub state: Option<String>,
}

/// Validated LAN action parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanParams {
    pub channel: u8,
    pub config: LanConfig,
}

/// Whether the user should exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserState {
    #[default]
    Present,
    Absent,
}

impl std::str::FromStr for UserState {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(UserState::Present),
            "absent" => Ok(UserState::Absent),
            other => Err(ParamError::InvalidState(other.to_string())),
        }
    }
}

/// Validated user action parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct UserParams {
    pub channel: u8,
    pub user: String,
    pub password: Option<String>,
    pub privileges: Option<String>,
    pub state: UserState,
}

impl std::fmt::Debug for UserParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserParams")
            .field("channel", &self.channel)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("privileges", &self.privileges)
            .field("state", &self.state)
            .finish()
    }
}

/// Read a JSON args file.
pub fn load_args<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ParamError> {
    let raw = fs::read_to_string(path).map_err(|source| ParamError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ParamError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Channel to address, defaulting to 1. Rejects numbers above 15.
pub fn validate_channel(channel: Option<u8>) -> Result<u8, ParamError> {
    let channel = channel.unwrap_or(DEFAULT_CHANNEL);
    if channel > MAX_CHANNEL {
        return Err(ParamError::InvalidChannel(channel));
    }
    Ok(channel)
}

impl TryFrom<RawLanArgs> for LanParams {
    type Error = ParamError;

    fn try_from(raw: RawLanArgs) -> Result<Self, Self::Error> {
        let channel = validate_channel(raw.channel)?;

        let mut by_attr = BTreeMap::new();
        for (key, value) in raw.config {
            let attr = key
                .parse::<LanAttribute>()
                .map_err(|_| ParamError::UnknownAttribute(key.clone()))?;
            by_attr.insert(attr, parse_setting(attr, &key, &value)?);
        }

        let order = [
            LanAttribute::Ip,
            LanAttribute::Netmask,
            LanAttribute::Gateway,
            LanAttribute::Vlan,
            LanAttribute::Dhcp,
        ];
        let settings = order
            .iter()
            .filter_map(|attr| by_attr.remove(attr))
            .collect();

        Ok(LanParams {
            channel,
            config: LanConfig::new(settings),
        })
    }
}

fn parse_setting(attr: LanAttribute, key: &str, value: &Value) -> Result<LanSetting, ParamError> {
    match attr {
        LanAttribute::Ip => parse_ipv4(key, value).map(LanSetting::Ip),
        LanAttribute::Netmask => parse_ipv4(key, value).map(LanSetting::Netmask),
        LanAttribute::Gateway => parse_ipv4(key, value).map(LanSetting::Gateway),
        LanAttribute::Vlan => parse_vlan(key, value).map(LanSetting::Vlan),
        LanAttribute::Dhcp => parse_bool(key, value).map(LanSetting::Dhcp),
        LanAttribute::Mac => Err(ParamError::ReadOnlyAttribute(attr)),
    }
}

fn invalid(key: &str, value: &Value, reason: &str) -> ParamError {
    ParamError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_ipv4(key: &str, value: &Value) -> Result<Ipv4Addr, ParamError> {
    value
        .as_str()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| invalid(key, value, "expected a dotted-decimal IPv4 address"))
}

fn parse_vlan(key: &str, value: &Value) -> Result<Vlan, ParamError> {
    let id = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            if ["none", "off", "disabled"]
                .iter()
                .any(|word| s.eq_ignore_ascii_case(word))
            {
                return Ok(Vlan::Disabled);
            }
            s.parse::<u64>().ok()
        }
        Value::Null => return Ok(Vlan::Disabled),
        _ => None,
    };
    match id {
        Some(id @ 1..=4094) => Ok(Vlan::Id(id as u16)),
        _ => Err(invalid(key, value, "expected 'none' or a VLAN id between 1 and 4094")),
    }
}

fn parse_bool(key: &str, value: &Value) -> Result<bool, ParamError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_u64() == Some(1) => Ok(true),
        Value::Number(n) if n.as_u64() == Some(0) => Ok(false),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "on" | "1" => Ok(true),
            "no" | "false" | "off" | "0" => Ok(false),
            _ => Err(invalid(key, value, "expected a boolean")),
        },
        _ => Err(invalid(key, value, "expected a boolean")),
    }
}

impl TryFrom<RawUserArgs> for UserParams {
    type Error = ParamError;

    fn try_from(raw: RawUserArgs) -> Result<Self, Self::Error> {
        let channel = validate_channel(raw.channel)?;

        let user = raw.user.ok_or(ParamError::MissingUser)?;
        if user.is_empty() {
            return Err(ParamError::MissingUser);
        }
        if user.chars().any(char::is_whitespace) {
            return Err(ParamError::InvalidUser {
                name: user,
                reason: "whitespace is not allowed".to_string(),
            });
        }
        if user.len() > MAX_USER_NAME {
            return Err(ParamError::InvalidUser {
                name: user,
                reason: format!("longer than {MAX_USER_NAME} bytes"),
            });
        }

        if raw.password.as_ref().is_some_and(|pw| pw.len() > MAX_PASSWORD) {
            return Err(ParamError::PasswordTooLong);
        }

        let privileges = match raw.privileges {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };

        let state = match raw.state {
            Some(state) => state.parse()?,
            None => UserState::default(),
        };

        Ok(UserParams {
            channel,
            user,
            password: raw.password,
            privileges,
            state,
        })
    }
}
