use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Attribute names reported by `ipmitool lan print`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LanAttribute {
    Dhcp,
    Ip,
    Netmask,
    Gateway,
    Vlan,
    Mac,
}

impl LanAttribute {
    /// Every attribute in the order it appears in a LAN status block.
    pub const ALL: [LanAttribute; 6] = [
        LanAttribute::Dhcp,
        LanAttribute::Ip,
        LanAttribute::Netmask,
        LanAttribute::Mac,
        LanAttribute::Gateway,
        LanAttribute::Vlan,
    ];

    /// Key used in parameters and diff output.
    pub fn name(self) -> &'static str {
        match self {
            LanAttribute::Dhcp => "dhcp",
            LanAttribute::Ip => "ip",
            LanAttribute::Netmask => "netmask",
            LanAttribute::Gateway => "gateway",
            LanAttribute::Vlan => "vlan",
            LanAttribute::Mac => "mac",
        }
    }
}

impl Display for LanAttribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for LanAttribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Raised when a key does not name a known LAN attribute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown LAN attribute '{0}'")]
pub struct UnknownAttribute(pub String);

impl FromStr for LanAttribute {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanAttribute::ALL
            .into_iter()
            .find(|attr| attr.name() == s)
            .ok_or_else(|| UnknownAttribute(s.to_string()))
    }
}

/// A single attribute value as printed by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Text(String),
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(value) => write!(f, "{value}"),
            AttributeValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// Current network configuration of one LAN channel.
///
/// Fields are `None` when the device output carried no matching line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
}

impl LanAttributes {
    /// Return the value of `attr` if the device reported it.
    pub fn get(&self, attr: LanAttribute) -> Option<AttributeValue> {
        match attr {
            LanAttribute::Dhcp => self.dhcp.map(AttributeValue::Bool),
            LanAttribute::Ip => self.ip.clone().map(AttributeValue::Text),
            LanAttribute::Netmask => self.netmask.clone().map(AttributeValue::Text),
            LanAttribute::Gateway => self.gateway.clone().map(AttributeValue::Text),
            LanAttribute::Vlan => self.vlan.clone().map(AttributeValue::Text),
            LanAttribute::Mac => self.mac.clone().map(AttributeValue::Text),
        }
    }

    /// Attributes present, in status-block order.
    pub fn entries(&self) -> Vec<(LanAttribute, AttributeValue)> {
        LanAttribute::ALL
            .into_iter()
            .filter_map(|attr| self.get(attr).map(|value| (attr, value)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
