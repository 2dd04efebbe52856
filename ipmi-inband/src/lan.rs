//! LAN channel reconciliation.
//!
//! [`LanChannel::load`] reads `lan print` once; [`LanChannel::apply`] then
//! issues one `lan set` per attribute whose desired value differs, recording
//! every transition in a [`LanDiff`].

use std::fmt::{self, Display, Formatter};
use std::net::Ipv4Addr;

use bmc_state_core::{parse_lan_print, AttributeValue, LanAttribute, LanAttributes, LanDiff};
use tracing::info;

use crate::error::IpmiError;
use crate::runner::{CommandRunner, IpmiTool};

/// 802.1q tagging setting of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vlan {
    Disabled,
    Id(u16),
}

impl Display for Vlan {
    /// Same spelling as the parsed `vlan` attribute.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Vlan::Disabled => f.write_str("none"),
            Vlan::Id(id) => write!(f, "{id}"),
        }
    }
}

/// One desired LAN attribute. `mac` is read-only and has no variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanSetting {
    Ip(Ipv4Addr),
    Netmask(Ipv4Addr),
    Gateway(Ipv4Addr),
    Vlan(Vlan),
    Dhcp(bool),
}

impl LanSetting {
    pub fn attribute(&self) -> LanAttribute {
        match self {
            LanSetting::Ip(_) => LanAttribute::Ip,
            LanSetting::Netmask(_) => LanAttribute::Netmask,
            LanSetting::Gateway(_) => LanAttribute::Gateway,
            LanSetting::Vlan(_) => LanAttribute::Vlan,
            LanSetting::Dhcp(_) => LanAttribute::Dhcp,
        }
    }

    /// Value in the form `lan print` reports it.
    pub fn desired_value(&self) -> AttributeValue {
        match self {
            LanSetting::Ip(addr) | LanSetting::Netmask(addr) | LanSetting::Gateway(addr) => {
                AttributeValue::Text(addr.to_string())
            }
            LanSetting::Vlan(vlan) => AttributeValue::Text(vlan.to_string()),
            LanSetting::Dhcp(dhcp) => AttributeValue::Bool(*dhcp),
        }
    }

    /// Setting words and value following `lan set <channel>`.
    pub fn device_args(&self) -> Vec<String> {
        let (setting_name, value) = match self {
            LanSetting::Ip(addr) => ("ipaddr", addr.to_string()),
            LanSetting::Netmask(addr) => ("netmask", addr.to_string()),
            LanSetting::Gateway(addr) => ("defgw ipaddr", addr.to_string()),
            LanSetting::Vlan(Vlan::Disabled) => ("vlan id", "off".to_string()),
            LanSetting::Vlan(Vlan::Id(id)) => ("vlan id", id.to_string()),
            LanSetting::Dhcp(true) => ("ipsrc", "dhcp".to_string()),
            LanSetting::Dhcp(false) => ("ipsrc", "static".to_string()),
        };
        let mut args: Vec<String> = setting_name.split(' ').map(str::to_string).collect();
        args.push(value);
        args
    }
}

/// Desired channel configuration, applied in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanConfig {
    settings: Vec<LanSetting>,
}

impl LanConfig {
    pub fn new(settings: Vec<LanSetting>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &[LanSetting] {
        &self.settings
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

/// A LAN channel being converged on a desired configuration.
#[derive(Debug)]
pub struct LanChannel<R> {
    tool: IpmiTool<R>,
    channel: u8,
    attrs: LanAttributes,
    diff: LanDiff,
    changed: bool,
}

impl<R: CommandRunner> LanChannel<R> {
    pub fn new(tool: IpmiTool<R>, channel: u8) -> Self {
        Self {
            tool,
            channel,
            attrs: LanAttributes::default(),
            diff: LanDiff::default(),
            changed: false,
        }
    }

    /// Read the channel's current configuration from the device.
    pub fn load(&mut self) -> Result<&LanAttributes, IpmiError> {
        let channel = self.channel.to_string();
        let status = self.tool.query(&["lan", "print", &channel])?;
        self.attrs = parse_lan_print(&status);
        Ok(&self.attrs)
    }

    /// Converge one attribute. Returns whether it differed.
    pub fn set_attribute(&mut self, setting: &LanSetting) -> Result<bool, IpmiError> {
        let attr = setting.attribute();
        let current = self
            .attrs
            .get(attr)
            .ok_or(IpmiError::MissingAttribute(attr))?;
        let desired = setting.desired_value();
        if current == desired {
            return Ok(false);
        }

        let channel = self.channel.to_string();
        let device_args = setting.device_args();
        let mut args = vec!["lan", "set", channel.as_str()];
        args.extend(device_args.iter().map(String::as_str));
        self.tool.mutate(&args, None)?;

        info!(
            channel = self.channel,
            attribute = %attr,
            before = %current,
            after = %desired,
            "LAN attribute changed"
        );
        self.diff.record(attr, current, desired);
        self.changed = true;
        Ok(true)
    }

    /// Converge every setting of `config`, stopping at the first failure.
    pub fn apply(&mut self, config: &LanConfig) -> Result<(), IpmiError> {
        for setting in config.settings() {
            self.set_attribute(setting)?;
        }
        Ok(())
    }

    pub fn attributes(&self) -> &LanAttributes {
        &self.attrs
    }

    pub fn diff(&self) -> &LanDiff {
        &self.diff
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn tool(&self) -> &IpmiTool<R> {
        &self.tool
    }

    pub fn into_tool(self) -> IpmiTool<R> {
        self.tool
    }
}
