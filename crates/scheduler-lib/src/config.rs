//! Scheduler configuration

use serde::Deserialize;

/// Upper bound the tagging API accepts for one page
pub const MAX_RESOURCES_PER_PAGE: i32 = 100;

/// Settings shared by every component of one deployment
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Region all provider calls are bound to
    pub region: String,

    /// Tag search page size; matches beyond the first page are not processed
    #[serde(default = "default_resources_per_page")]
    pub resources_per_page: i32,
}

fn default_resources_per_page() -> i32 {
    MAX_RESOURCES_PER_PAGE
}

impl SchedulerConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            resources_per_page: default_resources_per_page(),
        }
    }

    pub fn with_resources_per_page(mut self, resources_per_page: i32) -> Self {
        self.resources_per_page = resources_per_page;
        self
    }

    /// Page size clamped to what the tagging API accepts
    pub fn page_size(&self) -> i32 {
        self.resources_per_page.clamp(1, MAX_RESOURCES_PER_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_size() {
        let config = SchedulerConfig::new("ap-southeast-1");
        assert_eq!(config.page_size(), 100);
    }

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(
            SchedulerConfig::new("ap-east-1")
                .with_resources_per_page(500)
                .page_size(),
            100
        );
        assert_eq!(
            SchedulerConfig::new("ap-east-1")
                .with_resources_per_page(0)
                .page_size(),
            1
        );
        assert_eq!(
            SchedulerConfig::new("ap-east-1")
                .with_resources_per_page(25)
                .page_size(),
            25
        );
    }
}
