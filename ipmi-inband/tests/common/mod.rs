//! A stateful stand-in for `ipmitool` talking to a BMC.
//!
//! It answers `lan print` and `user list` from its own state, applies the
//! mutating subcommands to that state, and records every call.

#![allow(dead_code)]

use ipmi_inband::config::ToolConfig;
use ipmi_inband::runner::{CommandLine, CommandRunner, ExecResult, IpmiTool};
use ipmi_inband::IpmiError;

#[derive(Debug, Clone)]
pub struct Slot {
    pub name: String,
    /// `None` renders as `Unknown (0x00)`.
    pub privilege: Option<u8>,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct FakeBmc {
    pub static_ip: bool,
    pub ip: String,
    pub netmask: String,
    pub gateway: String,
    pub vlan: Option<u16>,
    pub mac: String,
    pub slots: Vec<Slot>,
    pub calls: Vec<Vec<String>>,
    /// Forced exit code for `user test`.
    pub test_exit: Option<i32>,
    /// Subcommand prefix that fails with the given exit code.
    pub fail_on: Option<(Vec<String>, i32)>,
    /// Leave the `Default Gateway IP` line out of `lan print`.
    pub omit_gateway: bool,
}

impl Default for FakeBmc {
    fn default() -> Self {
        let mut slots = vec![
            Slot {
                name: String::new(),
                privilege: Some(15),
                password: String::new(),
            };
            10
        ];
        slots[1] = Slot {
            name: "ADMIN".to_string(),
            privilege: Some(4),
            password: "ADMIN".to_string(),
        };
        for slot in slots.iter_mut().skip(2) {
            slot.privilege = None;
        }

        Self {
            static_ip: true,
            ip: "192.168.101.10".to_string(),
            netmask: "255.255.255.0".to_string(),
            gateway: "192.168.101.1".to_string(),
            vlan: Some(8),
            mac: "0c:c4:7a:cd:93:31".to_string(),
            slots,
            calls: Vec::new(),
            test_exit: None,
            fail_on: None,
            omit_gateway: false,
        }
    }
}

impl FakeBmc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only slots 1 and 2 exist, both occupied.
    pub fn full() -> Self {
        let mut bmc = Self::default();
        bmc.slots.truncate(2);
        bmc.slots[0] = Slot {
            name: "root".to_string(),
            privilege: Some(4),
            password: "calvin".to_string(),
        };
        bmc
    }

    pub fn slot(&self, id: usize) -> &Slot {
        &self.slots[id - 1]
    }

    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.name == name)
            .map(|i| i + 1)
    }

    /// Calls other than reads and password probes.
    pub fn mutations(&self) -> Vec<Vec<String>> {
        self.calls
            .iter()
            .filter(|call| {
                !matches!(
                    call.iter().map(String::as_str).collect::<Vec<_>>().as_slice(),
                    ["lan", "print", ..] | ["user", "list", ..] | ["user", "test", ..]
                )
            })
            .cloned()
            .collect()
    }

    pub fn called(&self, args: &[&str]) -> bool {
        self.calls.iter().any(|call| call == args)
    }

    pub fn lan_print(&self) -> String {
        let mut out = vec![
            "Set in Progress         : Set Complete".to_string(),
            format!(
                "IP Address Source       : {}",
                if self.static_ip {
                    "Static Address"
                } else {
                    "DHCP Address"
                }
            ),
            format!("IP Address              : {}", self.ip),
            format!("Subnet Mask             : {}", self.netmask),
            format!("MAC Address             : {}", self.mac),
            "SNMP Community String   : public".to_string(),
        ];
        if !self.omit_gateway {
            out.push(format!("Default Gateway IP      : {}", self.gateway));
        }
        out.push("Default Gateway MAC     : 00:00:00:00:00:00".to_string());
        out.push(format!(
            "802.1q VLAN ID          : {}",
            self.vlan
                .map(|id| id.to_string())
                .unwrap_or_else(|| "Disabled".to_string())
        ));
        out.push("802.1q VLAN Priority    : 0".to_string());
        out.join("\n") + "\n"
    }

    pub fn user_list(&self) -> String {
        let mut out =
            vec!["ID  Name\t     Callin  Link Auth\tIPMI Msg   Channel Priv Limit".to_string()];
        for (i, slot) in self.slots.iter().enumerate() {
            let privilege = match slot.privilege {
                Some(1) => "CALLBACK".to_string(),
                Some(2) => "USER".to_string(),
                Some(3) => "OPERATOR".to_string(),
                Some(4) => "ADMINISTRATOR".to_string(),
                Some(5) => "OEM".to_string(),
                Some(15) => "NO ACCESS".to_string(),
                Some(other) => format!("Unknown (0x{other:02x})"),
                None => "Unknown (0x00)".to_string(),
            };
            out.push(format!(
                "{:<4}{:<17}{:<8}{:<11}{:<11}{}",
                i + 1,
                slot.name,
                "true",
                "false",
                "true",
                privilege
            ));
        }
        out.join("\n") + "\n"
    }

    fn handle(&mut self, args: &[&str]) -> ExecResult {
        if let Some((prefix, code)) = &self.fail_on {
            if args.len() >= prefix.len() && args[..prefix.len()] == prefix[..] {
                return exit(*code, "", "Set command failed");
            }
        }

        match args {
            ["lan", "print", _] => exit(0, &self.lan_print(), ""),
            ["lan", "set", _, "ipaddr", value] => {
                self.ip = value.to_string();
                exit(0, "", "")
            }
            ["lan", "set", _, "netmask", value] => {
                self.netmask = value.to_string();
                exit(0, "", "")
            }
            ["lan", "set", _, "defgw", "ipaddr", value] => {
                self.gateway = value.to_string();
                exit(0, "", "")
            }
            ["lan", "set", _, "vlan", "id", "off"] => {
                self.vlan = None;
                exit(0, "", "")
            }
            ["lan", "set", _, "vlan", "id", value] => match value.parse() {
                Ok(id) => {
                    self.vlan = Some(id);
                    exit(0, "", "")
                }
                Err(_) => exit(1, "", "Invalid VLAN ID"),
            },
            ["lan", "set", _, "ipsrc", source] => {
                self.static_ip = *source == "static";
                exit(0, "", "")
            }
            ["user", "list", _] => exit(0, &self.user_list(), ""),
            // Naming a slot does not grant a privilege; it keeps reading
            // `Unknown (0x00)` until `user priv` runs.
            ["user", "set", "name", id, name] => {
                self.with_slot(id, |slot| slot.name = name.to_string())
            }
            ["user", "priv", id, level, _] => {
                let level = match level.strip_prefix("0x") {
                    Some(hex) => u8::from_str_radix(hex, 16),
                    None => level.parse(),
                };
                match level {
                    Ok(level) => self.with_slot(id, |slot| slot.privilege = Some(level)),
                    Err(_) => exit(1, "", "Invalid privilege level"),
                }
            }
            ["user", "test", id, "20", password] => {
                if let Some(code) = self.test_exit {
                    return exit(code, "", "");
                }
                let matches = id
                    .parse::<usize>()
                    .ok()
                    .and_then(|id| self.slots.get(id.wrapping_sub(1)))
                    .is_some_and(|slot| slot.password == *password);
                if matches {
                    exit(0, "Success", "")
                } else {
                    exit(1, "Failure: password incorrect", "")
                }
            }
            ["user", "set", "password", id, password, "20"] => {
                self.with_slot(id, |slot| slot.password = password.to_string())
            }
            _ => exit(1, "", "Invalid command"),
        }
    }

    fn with_slot(&mut self, id: &str, update: impl FnOnce(&mut Slot)) -> ExecResult {
        let slot = id
            .parse::<usize>()
            .ok()
            .and_then(|id| self.slots.get_mut(id.wrapping_sub(1)));
        match slot {
            Some(slot) => {
                update(slot);
                exit(0, "", "")
            }
            None => exit(1, "", "Invalid user id"),
        }
    }
}

impl CommandRunner for FakeBmc {
    fn run(&mut self, cmd: &CommandLine) -> Result<ExecResult, IpmiError> {
        let args: Vec<String> = cmd
            .args()
            .iter()
            .skip_while(|arg| *arg != "ipmitool")
            .skip(1)
            .cloned()
            .collect();
        self.calls.push(args.clone());
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        Ok(self.handle(&refs))
    }
}

fn exit(exit_code: i32, stdout: &str, stderr: &str) -> ExecResult {
    ExecResult {
        exit_code,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

pub fn tool(bmc: &mut FakeBmc, check_mode: bool) -> IpmiTool<&mut FakeBmc> {
    IpmiTool::new(bmc, &ToolConfig::default(), check_mode)
}
