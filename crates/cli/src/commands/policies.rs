//! Schedule policy listing

use anyhow::Result;
use scheduler_lib::{SchedulePolicy, SCHEDULE_TAG_KEY};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_info, print_json, print_table, OutputFormat};

/// Row for the policies table
#[derive(Tabled, Serialize)]
struct PolicyRow {
    #[tabled(rename = "Tag value")]
    value: &'static str,
    #[tabled(rename = "Running window (UTC+8)")]
    window: &'static str,
}

fn policy_rows() -> Vec<PolicyRow> {
    SchedulePolicy::ALL
        .iter()
        .map(|policy| PolicyRow {
            value: policy.as_str(),
            window: policy.window(),
        })
        .collect()
}

/// List the tag values the scheduler accepts
pub fn list_policies(format: OutputFormat) -> Result<()> {
    let rows = policy_rows();

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => {
            print_info(&format!("Tag key: {}", SCHEDULE_TAG_KEY));
            print_table(rows);
        }
    }

    Ok(())
}
