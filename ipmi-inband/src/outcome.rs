use bmc_state_core::LanDiff;
use serde::Serialize;

/// What an action did, as handed back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<LanDiff>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ActionResult {
    pub fn changed(changed: bool) -> Self {
        Self {
            changed,
            ..Self::default()
        }
    }

    pub fn with_diff(mut self, diff: LanDiff) -> Self {
        self.diff = Some(diff);
        self
    }

    /// A failure the action reports instead of aborting on.
    pub fn failed(changed: bool, msg: impl Into<String>) -> Self {
        Self {
            changed,
            failed: true,
            msg: Some(msg.into()),
            ..Self::default()
        }
    }
}
