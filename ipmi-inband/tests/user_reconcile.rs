mod common;

use bmc_state_core::{Privilege, PrivilegeLevel, SlotId};
use common::{tool, FakeBmc};
use ipmi_inband::action::run_user_action;
use ipmi_inband::params::{UserParams, UserState};
use ipmi_inband::users::IpmiUsers;
use ipmi_inband::IpmiError;
use pretty_assertions::assert_eq;

fn present(user: &str) -> UserParams {
    UserParams {
        channel: 1,
        user: user.to_string(),
        password: None,
        privileges: None,
        state: UserState::Present,
    }
}

fn absent(user: &str) -> UserParams {
    UserParams {
        state: UserState::Absent,
        ..present(user)
    }
}

#[test]
fn existing_user_is_left_alone() {
    let mut bmc = FakeBmc::new();

    let result = run_user_action(tool(&mut bmc, false), &present("ADMIN")).expect("user action");

    assert!(!result.changed);
    assert!(bmc.mutations().is_empty());
}

#[test]
fn new_user_claims_last_free_slot() {
    let mut bmc = FakeBmc::new();

    let result = run_user_action(tool(&mut bmc, false), &present("ops")).expect("user action");

    assert!(result.changed);
    assert_eq!(
        bmc.mutations(),
        vec![vec!["user", "set", "name", "10", "ops"]]
    );
    assert_eq!(bmc.slot_of("ops"), Some(10));

    bmc.calls.clear();
    let again = run_user_action(tool(&mut bmc, false), &present("ops")).expect("second run");
    assert!(!again.changed);
    assert!(bmc.mutations().is_empty());
}

#[test]
fn full_table_is_reported_not_raised() {
    let mut bmc = FakeBmc::full();

    let result = run_user_action(tool(&mut bmc, false), &present("ops")).expect("user action");

    assert!(result.failed);
    assert!(!result.changed);
    assert_eq!(
        result.msg.as_deref(),
        Some("no free user slot left to create user 'ops'")
    );
    assert!(bmc.mutations().is_empty());
}

#[test]
fn add_user_returns_pool_exhausted() {
    let mut bmc = FakeBmc::full();
    let mut users = IpmiUsers::new(tool(&mut bmc, false), 1);
    users.load().expect("load");

    let err = users.add_user("ops").expect_err("must fail");

    assert!(matches!(err, IpmiError::PoolExhausted { ref user } if user == "ops"));
    assert!(err.is_reportable());
}

#[test]
fn delete_revokes_then_blanks_name() {
    let mut bmc = FakeBmc::new();

    let result = run_user_action(tool(&mut bmc, false), &absent("ADMIN")).expect("user action");

    assert!(result.changed);
    assert_eq!(
        bmc.mutations(),
        vec![
            vec!["user", "priv", "2", "15", "1"],
            vec!["user", "set", "name", "2", ""],
        ]
    );
    assert_eq!(bmc.slot_of("ADMIN"), None);

    bmc.calls.clear();
    let again = run_user_action(tool(&mut bmc, false), &absent("ADMIN")).expect("second run");
    assert!(!again.changed);
}

#[test]
fn delete_in_check_mode_issues_nothing() {
    let mut bmc = FakeBmc::new();

    let result = run_user_action(tool(&mut bmc, true), &absent("ADMIN")).expect("user action");

    assert!(result.changed);
    assert!(bmc.mutations().is_empty());
    assert_eq!(bmc.slot_of("ADMIN"), Some(2));
}

#[test]
fn deleting_unknown_user_is_a_no_op() {
    let mut bmc = FakeBmc::new();

    let result = run_user_action(tool(&mut bmc, false), &absent("nobody")).expect("user action");

    assert!(!result.changed);
    assert!(bmc.mutations().is_empty());
}

#[test]
fn matching_password_is_not_rewritten() {
    let mut bmc = FakeBmc::new();
    let params = UserParams {
        password: Some("ADMIN".to_string()),
        ..present("ADMIN")
    };

    let result = run_user_action(tool(&mut bmc, false), &params).expect("user action");

    assert!(!result.changed);
    assert!(bmc.called(&["user", "test", "2", "20", "ADMIN"]));
    assert!(bmc.mutations().is_empty());
}

#[test]
fn mismatched_password_is_rewritten() {
    let mut bmc = FakeBmc::new();
    let params = UserParams {
        password: Some("s3cret".to_string()),
        ..present("ADMIN")
    };

    let result = run_user_action(tool(&mut bmc, false), &params).expect("user action");

    assert!(result.changed);
    assert_eq!(
        bmc.mutations(),
        vec![vec!["user", "set", "password", "2", "s3cret", "20"]]
    );
    assert_eq!(bmc.slot(2).password, "s3cret");
}

#[test]
fn password_probe_runs_in_check_mode() {
    let mut bmc = FakeBmc::new();
    let params = UserParams {
        password: Some("s3cret".to_string()),
        ..present("ADMIN")
    };

    let result = run_user_action(tool(&mut bmc, true), &params).expect("user action");

    assert!(result.changed);
    assert!(bmc.called(&["user", "test", "2", "20", "s3cret"]));
    assert!(bmc.mutations().is_empty());
    assert_eq!(bmc.slot(2).password, "ADMIN");
}

#[test]
fn unexpected_probe_exit_code_is_an_error_with_masked_password() {
    let mut bmc = FakeBmc::new();
    bmc.test_exit = Some(255);
    let params = UserParams {
        password: Some("s3cret".to_string()),
        ..present("ADMIN")
    };

    let err = run_user_action(tool(&mut bmc, false), &params).expect_err("must fail");

    match err {
        IpmiError::ToolFailed {
            command, exit_code, ..
        } => {
            assert_eq!(exit_code, 255);
            assert_eq!(command, "sudo ipmitool user test 2 20 ********");
        }
        other => panic!("expected ToolFailed, got {other:?}"),
    }
}

#[test]
fn new_user_gets_password_and_privileges_on_claimed_slot() {
    let mut bmc = FakeBmc::new();
    let params = UserParams {
        password: Some("s3cret".to_string()),
        privileges: Some("operator".to_string()),
        ..present("ops")
    };

    let result = run_user_action(tool(&mut bmc, false), &params).expect("user action");

    assert!(result.changed);
    assert_eq!(
        bmc.mutations(),
        vec![
            vec!["user", "set", "name", "10", "ops"],
            vec!["user", "set", "password", "10", "s3cret", "20"],
            vec!["user", "priv", "10", "3", "1"],
        ]
    );
    let user_lists = bmc
        .calls
        .iter()
        .filter(|call| call.starts_with(&["user".to_string(), "list".to_string()]))
        .count();
    assert_eq!(user_lists, 1);
    assert_eq!(bmc.slot(10).password, "s3cret");
    assert_eq!(bmc.slot(10).privilege, Some(3));

    bmc.calls.clear();
    let again = run_user_action(tool(&mut bmc, false), &params).expect("second run");
    assert!(!again.changed);
    assert!(bmc.mutations().is_empty());
}

#[test]
fn named_slot_without_privilege_is_adopted() {
    let mut bmc = FakeBmc::new();
    bmc.slots[3].name = "ops".to_string();
    let params = UserParams {
        password: Some("s3cret".to_string()),
        ..present("ops")
    };

    let result = run_user_action(tool(&mut bmc, false), &params).expect("user action");

    assert!(result.changed);
    assert_eq!(
        bmc.mutations(),
        vec![vec!["user", "set", "password", "4", "s3cret", "20"]]
    );
    assert_eq!(bmc.slot_of("ops"), Some(4));
    assert_eq!(bmc.slot(10).name, "");
}

#[test]
fn claimed_slot_is_not_handed_out_twice() {
    let mut bmc = FakeBmc::new();
    let mut users = IpmiUsers::new(tool(&mut bmc, false), 1);
    users.load().expect("load");

    users.add_user("ops").expect("add ops");
    users.set_user_privs("ghost", "user").expect_err("ghost is unknown");
    users.add_user("deploy").expect("add deploy");

    assert_eq!(users.claimed_slot("ops"), Some(SlotId(10)));
    assert_eq!(users.claimed_slot("deploy"), Some(SlotId(9)));
}

#[test]
fn deleting_named_slot_without_privilege_blanks_it() {
    let mut bmc = FakeBmc::new();
    bmc.slots[3].name = "ops".to_string();

    let result = run_user_action(tool(&mut bmc, false), &absent("ops")).expect("user action");

    assert!(result.changed);
    assert_eq!(
        bmc.mutations(),
        vec![
            vec!["user", "priv", "4", "15", "1"],
            vec!["user", "set", "name", "4", ""],
        ]
    );
    assert_eq!(bmc.slot_of("ops"), None);
}

#[test]
fn check_mode_add_leaves_free_pool_intact() {
    let mut bmc = FakeBmc::new();
    let mut users = IpmiUsers::new(tool(&mut bmc, true), 1);
    users.load().expect("load");

    users.add_user("ops").expect("add");

    assert!(users.changed());
    assert_eq!(users.users().free_slots.len(), 9);
    assert_eq!(users.claimed_slot("ops"), None);
    drop(users);
    assert!(bmc.mutations().is_empty());
}

#[test]
fn new_user_in_check_mode_skips_password_and_privileges() {
    let mut bmc = FakeBmc::new();
    let params = UserParams {
        password: Some("s3cret".to_string()),
        privileges: Some("operator".to_string()),
        ..present("ops")
    };

    let result = run_user_action(tool(&mut bmc, true), &params).expect("user action");

    assert!(result.changed);
    assert_eq!(bmc.calls, vec![vec!["user", "list", "1"]]);
}

#[test]
fn privileges_are_converged_by_name_or_number() {
    let mut bmc = FakeBmc::new();

    let same = UserParams {
        privileges: Some("Administrator".to_string()),
        ..present("ADMIN")
    };
    let result = run_user_action(tool(&mut bmc, false), &same).expect("user action");
    assert!(!result.changed);
    assert!(bmc.mutations().is_empty());

    let lower = UserParams {
        privileges: Some("2".to_string()),
        ..present("ADMIN")
    };
    let result = run_user_action(tool(&mut bmc, false), &lower).expect("user action");
    assert!(result.changed);
    assert_eq!(bmc.mutations(), vec![vec!["user", "priv", "2", "2", "1"]]);
    assert_eq!(bmc.slot(2).privilege, Some(2));
}

#[test]
fn unrecognized_privilege_is_ignored() {
    let mut bmc = FakeBmc::new();
    let params = UserParams {
        privileges: Some("superuser".to_string()),
        ..present("ADMIN")
    };

    let result = run_user_action(tool(&mut bmc, false), &params).expect("user action");

    assert!(!result.changed);
    assert!(!result.failed);
    assert!(bmc.mutations().is_empty());
}

#[test]
fn user_vanishing_after_reload_is_unknown() {
    let mut bmc = FakeBmc::new();
    let mut users = IpmiUsers::new(tool(&mut bmc, false), 1);
    users.load().expect("load");

    let err = users
        .set_user_privs("ghost", "user")
        .expect_err("must fail");

    assert!(matches!(err, IpmiError::UnknownUser(ref name) if name == "ghost"));
    assert!(!err.is_reportable());
}

#[test]
fn load_reads_occupied_users_and_free_slots() {
    let mut bmc = FakeBmc::new();
    let mut users = IpmiUsers::new(tool(&mut bmc, false), 1);

    let table = users.load().expect("load").clone();

    assert_eq!(table.users.keys().collect::<Vec<_>>(), vec!["ADMIN"]);
    assert_eq!(
        table.get("ADMIN").map(|record| &record.privileges),
        Some(&Privilege::Level(PrivilegeLevel::Administrator))
    );
    assert_eq!(table.free_slots.len(), 9);
    assert!(!users.changed());
}
