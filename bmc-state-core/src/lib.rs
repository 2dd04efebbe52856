//! Parsing and diff primitives for in-band `ipmitool` output.
//!
//! Everything here is a pure function of the text the device printed; no
//! process is ever spawned from this crate.

pub mod diff;
pub mod format;
pub mod lan;
pub mod parser;
pub mod user;

pub use diff::{AttributeMap, LanDiff};
pub use format::{format_diff_text, format_json, format_lan_text, format_summary, format_users_text};
pub use lan::{AttributeValue, LanAttribute, LanAttributes, UnknownAttribute};
pub use parser::{classify_user_row, parse_lan_print, parse_user_list};
pub use user::{
    Privilege, PrivilegeLevel, SlotId, UnknownPrivilege, UserRecord, UserRow, UserTable,
};
