//! Local BMC user reconciliation.
//!
//! The user table has a fixed number of slots and no delete primitive, so a
//! user is "created" by naming a free slot and "deleted" by revoking its
//! privileges and blanking its name.
//!
//! A freshly named slot keeps reading `Unknown (0x00)` until it is granted a
//! privilege, so the listing still reports it as free. Slots claimed during
//! a run are remembered, and named slots without a privilege are adopted
//! instead of claiming another one.

use std::collections::BTreeMap;

use bmc_state_core::{parse_user_list, PrivilegeLevel, SlotId, UserRecord, UserTable};
use tracing::{debug, info, warn};

use crate::error::IpmiError;
use crate::runner::{CommandRunner, IpmiTool};

/// Password storage size passed to `user test` and `user set password`.
const PASSWORD_SIZE: &str = "20";

/// Exit code of `ipmitool user test` when the password does not match.
const PASSWORD_MISMATCH: i32 = 1;

/// Users of one channel being converged on a desired state.
#[derive(Debug)]
pub struct IpmiUsers<R> {
    tool: IpmiTool<R>,
    channel: u8,
    table: UserTable,
    /// Slots named by this run, keyed by user name.
    claimed: BTreeMap<String, SlotId>,
    changed: bool,
}

impl<R: CommandRunner> IpmiUsers<R> {
    pub fn new(tool: IpmiTool<R>, channel: u8) -> Self {
        Self {
            tool,
            channel,
            table: UserTable::default(),
            claimed: BTreeMap::new(),
            changed: false,
        }
    }

    /// Read the channel's user table from the device.
    pub fn load(&mut self) -> Result<&UserTable, IpmiError> {
        let channel = self.channel.to_string();
        let listing = self.tool.query(&["user", "list", &channel])?;
        self.table = parse_user_list(&listing);
        let claimed = &self.claimed;
        self.table
            .free_slots
            .retain(|slot| !claimed.values().any(|id| id == slot));
        debug!(
            channel = self.channel,
            users = self.table.users.len(),
            free_slots = self.table.free_slots.len(),
            "loaded user table"
        );
        Ok(&self.table)
    }

    /// Ensure a user called `name` exists, claiming a free slot if needed.
    pub fn add_user(&mut self, name: &str) -> Result<(), IpmiError> {
        if self.table.contains(name) || self.claimed.contains_key(name) {
            return Ok(());
        }

        if let Some(&uid) = self.table.unprivileged.get(name) {
            debug!(user = name, slot = %uid, "adopting named slot without privilege");
            self.table.free_slots.retain(|slot| *slot != uid);
            self.claimed.insert(name.to_string(), uid);
            return Ok(());
        }

        let Some(&uid) = self.table.free_slots.last() else {
            return Err(IpmiError::PoolExhausted {
                user: name.to_string(),
            });
        };

        self.changed = true;
        if self.tool.check_mode() {
            info!(user = name, slot = %uid, "check mode: not claiming slot");
            return Ok(());
        }

        let slot = uid.to_string();
        self.tool.mutate(&["user", "set", "name", &slot, name], None)?;
        self.table.free_slots.pop();
        self.claimed.insert(name.to_string(), uid);

        info!(user = name, slot = %uid, "user created");
        Ok(())
    }

    /// Ensure no user called `name` exists.
    pub fn delete_user(&mut self, name: &str) -> Result<(), IpmiError> {
        let uid = self
            .table
            .get(name)
            .map(|record| record.id)
            .or_else(|| self.table.unprivileged.get(name).copied());
        let Some(uid) = uid else {
            return Ok(());
        };

        self.changed = true;
        if self.tool.check_mode() {
            return Ok(());
        }

        let uid = uid.to_string();
        let no_access = PrivilegeLevel::NoAccess.value().to_string();
        let channel = self.channel.to_string();
        self.tool
            .mutate(&["user", "priv", &uid, &no_access, &channel], None)?;
        self.tool.mutate(&["user", "set", "name", &uid, ""], None)?;

        info!(user = name, slot = %uid, "user removed");
        Ok(())
    }

    /// Ensure `name` authenticates with `password`, rewriting it only when
    /// the device rejects it.
    pub fn set_user_password(&mut self, name: &str, password: &str) -> Result<(), IpmiError> {
        let Some(uid) = self.resolve_slot(name)? else {
            return Ok(());
        };

        let uid = uid.to_string();
        let test_args = ["user", "test", uid.as_str(), PASSWORD_SIZE, password];
        let test = self.tool.probe(&test_args, Some(4))?;
        match test.exit_code {
            0 => Ok(()),
            PASSWORD_MISMATCH => {
                self.tool.mutate(
                    &["user", "set", "password", &uid, password, PASSWORD_SIZE],
                    Some(4),
                )?;
                info!(user = name, slot = %uid, "password updated");
                self.changed = true;
                Ok(())
            }
            exit_code => Err(IpmiError::ToolFailed {
                command: self.tool.display_command(&test_args, Some(4)),
                exit_code,
                output: test.combined_output(),
            }),
        }
    }

    /// Ensure `name` holds the privilege level named by `privs`.
    ///
    /// `privs` may be a level name or its numeric value. Unrecognized input
    /// is ignored.
    pub fn set_user_privs(&mut self, name: &str, privs: &str) -> Result<(), IpmiError> {
        let level = match privs.parse::<PrivilegeLevel>() {
            Ok(level) => level,
            Err(err) => {
                warn!(user = name, error = %err, "ignoring privilege setting");
                return Ok(());
            }
        };

        let Some(uid) = self.resolve_slot(name)? else {
            return Ok(());
        };

        let current = self.table.get(name).and_then(|record| record.privileges.level());
        if current == Some(level) {
            return Ok(());
        }

        let uid = uid.to_string();
        let value = level.value().to_string();
        let channel = self.channel.to_string();
        self.tool
            .mutate(&["user", "priv", &uid, &value, &channel], None)?;
        info!(user = name, slot = %uid, privileges = %level, "privileges updated");
        self.changed = true;
        Ok(())
    }

    /// Slot of `name`. A user missing from the loaded table may have been
    /// named outside this run: re-read in normal mode, give up quietly in
    /// check mode.
    fn resolve_slot(&mut self, name: &str) -> Result<Option<SlotId>, IpmiError> {
        if let Some(uid) = self.known_slot(name) {
            return Ok(Some(uid));
        }
        if self.tool.check_mode() {
            debug!(user = name, "check mode: assuming new user is configured");
            return Ok(None);
        }

        self.load()?;
        self.known_slot(name)
            .or_else(|| self.table.unprivileged.get(name).copied())
            .map(Some)
            .ok_or_else(|| IpmiError::UnknownUser(name.to_string()))
    }

    fn known_slot(&self, name: &str) -> Option<SlotId> {
        self.table
            .get(name)
            .map(|record| record.id)
            .or_else(|| self.claimed.get(name).copied())
    }

    pub fn users(&self) -> &UserTable {
        &self.table
    }

    pub fn user(&self, name: &str) -> Option<&UserRecord> {
        self.table.get(name)
    }

    /// Slot claimed or adopted for `name` during this run.
    pub fn claimed_slot(&self, name: &str) -> Option<SlotId> {
        self.claimed.get(name).copied()
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
