use crate::diff::LanDiff;
use crate::lan::LanAttributes;
use crate::user::UserTable;

/// Format diff entries as plain text, one `~ attr: before -> after` per change.
pub fn format_diff_text(diff: &LanDiff) -> String {
    diff.changes()
        .map(|(attr, before, after)| format!("~ {attr}: {before} -> {after}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a one-line summary of a reconcile run.
pub fn format_summary(changed: bool, diff: Option<&LanDiff>) -> String {
    match diff {
        Some(diff) => format!("changed={changed} modified={}", diff.after.len()),
        None => format!("changed={changed}"),
    }
}

/// Format parsed LAN attributes as `key = value` lines.
pub fn format_lan_text(attrs: &LanAttributes) -> String {
    attrs
        .entries()
        .into_iter()
        .map(|(attr, value)| format!("{:<8}= {value}", attr.name()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a user table as aligned rows followed by the free slot list.
pub fn format_users_text(table: &UserTable) -> String {
    let mut records: Vec<_> = table.users.values().collect();
    records.sort_by_key(|record| record.id);

    let mut lines = Vec::with_capacity(records.len() + 2);
    lines.push(format!(
        "{:<4}{:<17}{:<8}{:<10}{:<10}{}",
        "ID", "Name", "Callin", "LinkAuth", "IPMIMsg", "Privileges"
    ));
    for record in records {
        lines.push(format!(
            "{:<4}{:<17}{:<8}{:<10}{:<10}{}",
            record.id,
            record.name,
            record.callin,
            record.link_auth,
            record.ipmi_msg,
            record.privileges
        ));
    }

    let free: Vec<String> = table.free_slots.iter().map(ToString::to_string).collect();
    lines.push(format!("free slots: {}", free.join(",")));
    lines.join("\n")
}
