//! Action executors
//!
//! One pipeline per resource category. Each locates tagged resources,
//! filters out those already in (or unable to reach) the requested state,
//! and requests the transition for the rest. Resources are handled one at a
//! time and the first provider failure aborts the remainder.

mod compute;
mod database;
mod nodegroup;

pub use compute::ComputePipeline;
pub use database::DatabasePipeline;
pub use nodegroup::NodeGroupPipeline;

use crate::error::Result;
use crate::models::{Automation, ResourceCategory, ResourceRef, TagSelector};

pub use async_trait::async_trait;

/// Locate -> filter -> transition for one resource category
#[async_trait]
pub trait Pipeline: Send + Sync {
    fn category(&self) -> ResourceCategory;

    /// Run the pipeline and return the resources a transition was requested for
    async fn run(&self, automation: Automation, selector: &TagSelector) -> Result<Vec<ResourceRef>>;
}
