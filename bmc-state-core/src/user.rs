use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// 1-based index into the BMC user table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SlotId(pub u8);

impl Display for SlotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for SlotId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(SlotId)
    }
}

/// IPMI channel privilege levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivilegeLevel {
    Callback,
    User,
    Operator,
    Administrator,
    OemProprietary,
    NoAccess,
}

/// Raised when text names no privilege level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown privilege level '{0}'")]
pub struct UnknownPrivilege(pub String);

impl PrivilegeLevel {
    pub const ALL: [PrivilegeLevel; 6] = [
        PrivilegeLevel::Callback,
        PrivilegeLevel::User,
        PrivilegeLevel::Operator,
        PrivilegeLevel::Administrator,
        PrivilegeLevel::OemProprietary,
        PrivilegeLevel::NoAccess,
    ];

    /// Numeric level passed to `ipmitool user priv`.
    pub fn value(self) -> u8 {
        match self {
            PrivilegeLevel::Callback => 1,
            PrivilegeLevel::User => 2,
            PrivilegeLevel::Operator => 3,
            PrivilegeLevel::Administrator => 4,
            PrivilegeLevel::OemProprietary => 5,
            PrivilegeLevel::NoAccess => 0xF,
        }
    }

    /// Lower-case name as printed by the device.
    pub fn name(self) -> &'static str {
        match self {
            PrivilegeLevel::Callback => "callback",
            PrivilegeLevel::User => "user",
            PrivilegeLevel::Operator => "operator",
            PrivilegeLevel::Administrator => "administrator",
            PrivilegeLevel::OemProprietary => "oem proprietary",
            PrivilegeLevel::NoAccess => "no access",
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        PrivilegeLevel::ALL
            .into_iter()
            .find(|level| level.value() == value)
    }

    /// Case-insensitive lookup by device name.
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        if lowered == "oem" {
            return Some(PrivilegeLevel::OemProprietary);
        }
        PrivilegeLevel::ALL
            .into_iter()
            .find(|level| level.name() == lowered)
    }
}

impl FromStr for PrivilegeLevel {
    type Err = UnknownPrivilege;

    /// Accepts a level name, a decimal value or a `0x` hex value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let numeric = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u8::from_str_radix(hex, 16).ok(),
            None => trimmed.parse::<u8>().ok(),
        };
        numeric
            .and_then(PrivilegeLevel::from_value)
            .or_else(|| PrivilegeLevel::from_name(trimmed))
            .ok_or_else(|| UnknownPrivilege(s.to_string()))
    }
}

impl Display for PrivilegeLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for PrivilegeLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

/// Privilege column of a user row: a known level or the raw device text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Privilege {
    Level(PrivilegeLevel),
    Raw(String),
}

impl Privilege {
    pub fn parse(text: &str) -> Self {
        match PrivilegeLevel::from_name(text) {
            Some(level) => Privilege::Level(level),
            None => Privilege::Raw(text.to_string()),
        }
    }

    pub fn level(&self) -> Option<PrivilegeLevel> {
        match self {
            Privilege::Level(level) => Some(*level),
            Privilege::Raw(_) => None,
        }
    }
}

impl Display for Privilege {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Privilege::Level(level) => write!(f, "{level}"),
            Privilege::Raw(raw) => f.write_str(raw),
        }
    }
}

/// An occupied slot of the user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: SlotId,
    pub name: String,
    #[serde(rename = "Callin")]
    pub callin: bool,
    #[serde(rename = "LinkAuth")]
    pub link_auth: bool,
    #[serde(rename = "IPMIMsg")]
    pub ipmi_msg: bool,
    pub privileges: Privilege,
}

/// Classification of one line of `ipmitool user list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRow {
    Header,
    Blank,
    Free(SlotId),
    /// Named slot whose privilege still reads `Unknown (0x00)`.
    Unprivileged { id: SlotId, name: String },
    Occupied(UserRecord),
    Malformed(String),
}

/// Parsed user table of one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserTable {
    /// Occupied slots keyed by user name.
    pub users: BTreeMap<String, UserRecord>,
    /// Unoccupied slots in listing order.
    pub free_slots: Vec<SlotId>,
    /// Names written to slots that were never granted a privilege. Their
    /// ids are also in `free_slots`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub unprivileged: BTreeMap<String, SlotId>,
}

impl UserTable {
    pub fn get(&self, name: &str) -> Option<&UserRecord> {
        self.users.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.users.contains_key(name)
    }
}
