//! Read-only resource discovery

use anyhow::Result;
use scheduler_lib::locator::ResourceLocator;
use scheduler_lib::{
    AwsProvider, ResourceCategory, ResourceRef, SchedulerConfig, StructuredLogger, TagSelector,
};
use std::sync::Arc;
use tabled::Tabled;

use crate::config::Resolved;
use crate::output::{print_info, print_json, print_table, print_warning, OutputFormat};

/// Row for the located resources table
#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Type")]
    resource_type: &'static str,
    #[tabled(rename = "Resource")]
    resource: String,
}

fn resource_rows(category: ResourceCategory, found: &[ResourceRef]) -> Vec<ResourceRow> {
    found
        .iter()
        .map(|resource| ResourceRow {
            resource_type: category.resource_type(),
            resource: resource.to_string(),
        })
        .collect()
}

/// List what an invocation with this tag would act on, without acting
pub async fn locate_resources(
    settings: &Resolved,
    category: ResourceCategory,
    tag_key: &str,
    tag_value: &str,
) -> Result<()> {
    let selector = TagSelector::new(tag_key, tag_value)?;

    let config = SchedulerConfig::new(settings.region.as_str());
    let provider =
        Arc::new(AwsProvider::connect(&settings.region, settings.profile.as_deref()).await);
    let locator = ResourceLocator::new(
        provider,
        config.page_size(),
        StructuredLogger::new(settings.region.as_str()),
    );

    let found = locator.locate(&selector, category).await?;

    match settings.format {
        OutputFormat::Json => print_json(&found)?,
        OutputFormat::Table => {
            if found.is_empty() {
                print_warning(&format!("No {} resources tagged {}", category, selector.value));
                return Ok(());
            }
            print_table(resource_rows(category, &found));
            print_info(&format!("Total: {} resources", found.len()));
        }
    }

    Ok(())
}
