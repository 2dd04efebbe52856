use bmc_state_core::LanAttribute;
use thiserror::Error;

/// Errors raised while querying or converging BMC state.
#[derive(Debug, Error)]
pub enum IpmiError {
    /// The command could not be started at all.
    #[error("failed to execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// The command ran and exited non-zero where success was required.
    #[error("command '{command}' failed (exit code {exit_code}): {output}")]
    ToolFailed {
        command: String,
        exit_code: i32,
        output: String,
    },
    /// Every user slot of the channel is occupied.
    #[error("no free user slot left to create user '{user}'")]
    PoolExhausted { user: String },
    /// A desired attribute was not present in the device output.
    #[error("device did not report LAN attribute '{0}'")]
    MissingAttribute(LanAttribute),
    /// The user is still absent after re-reading the user list.
    #[error("user '{0}' not found on the device")]
    UnknownUser(String),
}

impl IpmiError {
    /// True for failures that are reported in the result instead of aborting.
    pub fn is_reportable(&self) -> bool {
        matches!(self, IpmiError::PoolExhausted { .. })
    }
}
