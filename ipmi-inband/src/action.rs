//! The two actions exposed to callers: converge a LAN channel, converge a
//! user. Each reads device state fresh, reconciles, and assembles an
//! [`ActionResult`].

use tracing::warn;

use crate::error::IpmiError;
use crate::lan::LanChannel;
use crate::outcome::ActionResult;
use crate::params::{LanParams, UserParams, UserState};
use crate::runner::{CommandRunner, IpmiTool};
use crate::users::IpmiUsers;

/// Converge a LAN channel on `params.config`.
///
/// The diff is attached only when `want_diff` is set.
pub fn run_lan_action<R: CommandRunner>(
    tool: IpmiTool<R>,
    params: &LanParams,
    want_diff: bool,
) -> Result<ActionResult, IpmiError> {
    let mut channel = LanChannel::new(tool, params.channel);
    channel.load()?;
    channel.apply(&params.config)?;

    let result = ActionResult::changed(channel.changed());
    Ok(if want_diff {
        result.with_diff(channel.diff().clone())
    } else {
        result
    })
}

/// Converge one user on the requested state, password and privileges.
///
/// Running out of free slots is reported in the result rather than returned
/// as an error.
pub fn run_user_action<R: CommandRunner>(
    tool: IpmiTool<R>,
    params: &UserParams,
) -> Result<ActionResult, IpmiError> {
    let mut users = IpmiUsers::new(tool, params.channel);
    users.load()?;

    match converge_user(&mut users, params) {
        Ok(()) => Ok(ActionResult::changed(users.changed())),
        Err(err) if err.is_reportable() => {
            warn!(user = %params.user, error = %err, "user action failed");
            Ok(ActionResult::failed(users.changed(), err.to_string()))
        }
        Err(err) => Err(err),
    }
}

fn converge_user<R: CommandRunner>(
    users: &mut IpmiUsers<R>,
    params: &UserParams,
) -> Result<(), IpmiError> {
    match params.state {
        UserState::Present => {
            users.add_user(&params.user)?;
            if let Some(password) = &params.password {
                users.set_user_password(&params.user, password)?;
            }
            if let Some(privileges) = &params.privileges {
                users.set_user_privs(&params.user, privileges)?;
            }
        }
        UserState::Absent => users.delete_user(&params.user)?,
    }
    Ok(())
}
