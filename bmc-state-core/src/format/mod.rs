//! Diff and state output formatters.

pub mod json;
pub mod text;

pub use json::format_json;
pub use text::{format_diff_text, format_lan_text, format_summary, format_users_text};
