//! Execute one invocation against the live account

use anyhow::{Context, Result};
use scheduler_lib::{
    ActionResult, AwsProvider, Clients, Dispatcher, InvocationEvent, InvocationStatus,
    SchedulerConfig,
};
use std::sync::Arc;
use tabled::Tabled;

use crate::config::Resolved;
use crate::output::{color_status, print_json, print_table, print_success, print_warning, OutputFormat};

/// Row for the envelope table
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn envelope_rows(result: &ActionResult) -> Vec<FieldRow> {
    let mut rows = vec![
        FieldRow {
            field: "Status",
            value: color_status(&result.status.to_string()),
        },
        FieldRow {
            field: "Account",
            value: result.account_id.clone(),
        },
        FieldRow {
            field: "Time",
            value: result.time.clone(),
        },
    ];

    if let Some(action) = &result.action {
        rows.push(FieldRow {
            field: "Action",
            value: action.clone(),
        });
    }
    if let Some(resources) = &result.resources {
        let listed: Vec<String> = resources.iter().map(ToString::to_string).collect();
        rows.push(FieldRow {
            field: "Resources",
            value: if listed.is_empty() {
                "-".to_string()
            } else {
                listed.join("\n")
            },
        });
    }

    rows
}

/// Start or stop everything carrying the tag, exactly as the handler would
pub async fn run_invocation(
    settings: &Resolved,
    automation: &str,
    resource: &str,
    tag_key: &str,
    tag_value: &str,
) -> Result<()> {
    let provider =
        Arc::new(AwsProvider::connect(&settings.region, settings.profile.as_deref()).await);
    let account_id = provider
        .caller_account()
        .await
        .context("Failed to resolve the caller account")?;

    let dispatcher = Dispatcher::new(
        Clients::from_provider(provider),
        &SchedulerConfig::new(settings.region.as_str()),
    );
    let event = InvocationEvent::new(automation, resource, tag_key, tag_value);
    let result = dispatcher
        .dispatch(&event, &account_id)
        .await
        .context("Invocation failed")?;

    match settings.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            print_table(envelope_rows(&result));
            match (&result.status, &result.resources) {
                (InvocationStatus::Successful, Some(resources)) => {
                    print_success(&format!("{} resources transitioned", resources.len()))
                }
                _ => print_warning("Request rejected; check the tag key, tag value and action"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scheduler_lib::ResourceRef;

    #[test]
    fn test_failed_envelope_rows() {
        let rows = envelope_rows(&ActionResult::failed("123456789012"));
        let fields: Vec<_> = rows.iter().map(|row| row.field).collect();
        assert_eq!(fields, vec!["Status", "Account", "Time"]);
    }

    #[test]
    fn test_successful_envelope_rows() {
        let result = ActionResult::successful(
            "123456789012",
            "Stop EC2 instance",
            vec![
                ResourceRef::Instance("i-1".to_string()),
                ResourceRef::Instance("i-2".to_string()),
            ],
        );
        let rows = envelope_rows(&result);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[3].value, "Stop EC2 instance");
        assert_eq!(rows[4].value, "i-1\ni-2");
    }
}
