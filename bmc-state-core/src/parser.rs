use tracing::debug;

use crate::lan::LanAttributes;
use crate::user::{Privilege, SlotId, UserRecord, UserRow, UserTable};

/// Leading text of the column header printed by `ipmitool user list`.
pub const USER_LIST_HEADER: &str = "ID  Name";

/// Privilege text the device prints for a slot nobody occupies.
pub const FREE_SLOT_MARKER: &str = "Unknown (0x00)";

const IP_SOURCE_PREFIX: &str = "IP Address Source";
// The two trailing spaces keep "IP Address Source" from matching.
const IP_PREFIX: &str = "IP Address  ";
const NETMASK_PREFIX: &str = "Subnet Mask";
const GATEWAY_PREFIX: &str = "Default Gateway IP";
const VLAN_PREFIX: &str = "802.1q VLAN ID";
const MAC_PREFIX: &str = "MAC Address";

/// Parse the output of `ipmitool lan print <channel>`.
///
/// Lines are recognized by fixed prefixes and anything else is ignored.
/// A recognized line without a `:` separator leaves its attribute unset.
pub fn parse_lan_print(status: &str) -> LanAttributes {
    let mut attrs = LanAttributes::default();

    for row in status.lines() {
        let row = row.trim_end_matches('\r');

        if row.starts_with(IP_SOURCE_PREFIX) {
            attrs.dhcp = Some(!row.trim_end().ends_with("Static Address"));
        } else if row.starts_with(IP_PREFIX) {
            attrs.ip = field_value(row);
        } else if row.starts_with(NETMASK_PREFIX) {
            attrs.netmask = field_value(row);
        } else if row.starts_with(GATEWAY_PREFIX) {
            attrs.gateway = field_value(row);
        } else if row.starts_with(VLAN_PREFIX) {
            attrs.vlan = field_value(row).map(|vlan| {
                if vlan == "Disabled" {
                    "none".to_string()
                } else {
                    vlan
                }
            });
        } else if row.starts_with(MAC_PREFIX) {
            attrs.mac = field_value(row);
        }
    }

    attrs
}

/// Text after the first `:`, trimmed. MAC addresses keep their own colons.
fn field_value(row: &str) -> Option<String> {
    row.split_once(':')
        .map(|(_, value)| value.trim().to_string())
}

/// Classify one line of `ipmitool user list <channel>`.
///
/// Rows look like `2   ADMIN   false   false   true   ADMINISTRATOR`. A slot
/// is free when its privilege column reads `Unknown (0x00)` or when the name
/// column is empty, which shifts the flag columns one token to the left.
pub fn classify_user_row(line: &str) -> UserRow {
    let line = line.trim_end_matches('\r');

    if line.starts_with(USER_LIST_HEADER) {
        return UserRow::Header;
    }
    if line.trim().is_empty() {
        return UserRow::Blank;
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Ok(id) = tokens[0].parse::<SlotId>() else {
        return UserRow::Malformed(line.to_string());
    };

    if line.trim_end().ends_with(FREE_SLOT_MARKER) {
        // id, name, three flags and the two marker words.
        return match tokens.as_slice() {
            [_, name, _, _, _, _, _] => UserRow::Unprivileged {
                id,
                name: name.to_string(),
            },
            _ => UserRow::Free(id),
        };
    }

    match tokens.len() {
        5 => UserRow::Free(id),
        n if n >= 6 => {
            if let Some([callin, link_auth, ipmi_msg]) = parse_flags(&tokens[2..5]) {
                UserRow::Occupied(UserRecord {
                    id,
                    name: tokens[1].to_string(),
                    callin,
                    link_auth,
                    ipmi_msg,
                    privileges: Privilege::parse(&tokens[5..].join(" ")),
                })
            } else if parse_flags(&tokens[1..4]).is_some() {
                // Empty name followed by a multi-word privilege such as "NO ACCESS".
                UserRow::Free(id)
            } else {
                UserRow::Malformed(line.to_string())
            }
        }
        _ => UserRow::Malformed(line.to_string()),
    }
}

fn parse_flags(tokens: &[&str]) -> Option<[bool; 3]> {
    match tokens {
        [a, b, c] => Some([a.parse().ok()?, b.parse().ok()?, c.parse().ok()?]),
        _ => None,
    }
}

/// Parse the output of `ipmitool user list <channel>` into occupied users and
/// free slots.
pub fn parse_user_list(listing: &str) -> UserTable {
    let mut table = UserTable::default();

    for line in listing.lines() {
        match classify_user_row(line) {
            UserRow::Header | UserRow::Blank => {}
            UserRow::Free(id) => table.free_slots.push(id),
            UserRow::Unprivileged { id, name } => {
                table.free_slots.push(id);
                table.unprivileged.insert(name, id);
            }
            UserRow::Occupied(record) => {
                table.users.insert(record.name.clone(), record);
            }
            UserRow::Malformed(row) => debug!(row = %row, "skipping unrecognized user list row"),
        }
    }

    table
}
