//! Handler configuration

use anyhow::{Context, Result};
use scheduler_lib::config::MAX_RESOURCES_PER_PAGE;
use scheduler_lib::SchedulerConfig;
use serde::Deserialize;
use std::collections::HashMap;

/// Handler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HandlerConfig {
    /// Region of the deployment, taken from `AWS_REGION`
    pub region: String,

    /// Tag search page size
    #[serde(default = "default_resources_per_page")]
    pub resources_per_page: i32,
}

fn default_resources_per_page() -> i32 {
    MAX_RESOURCES_PER_PAGE
}

impl HandlerConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Load configuration from an explicit set of environment variables
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let region = vars.get("AWS_REGION").filter(|r| !r.is_empty()).cloned();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("SCHEDULER")
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .set_override_option("region", region)?
            .build()?;

        config
            .try_deserialize()
            .context("AWS_REGION must be set to the region this scheduler manages")
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig::new(self.region.as_str()).with_resources_per_page(self.resources_per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_region_from_aws_region() {
        let config = HandlerConfig::from_vars(vars(&[("AWS_REGION", "ap-southeast-1")])).unwrap();
        assert_eq!(config.region, "ap-southeast-1");
        assert_eq!(config.resources_per_page, 100);
    }

    #[test]
    fn test_missing_region_is_an_error() {
        assert!(HandlerConfig::from_vars(vars(&[])).is_err());
        assert!(HandlerConfig::from_vars(vars(&[("AWS_REGION", "")])).is_err());
    }

    #[test]
    fn test_page_size_override() {
        let config = HandlerConfig::from_vars(vars(&[
            ("AWS_REGION", "eu-west-1"),
            ("SCHEDULER_RESOURCES_PER_PAGE", "25"),
        ]))
        .unwrap();
        assert_eq!(config.resources_per_page, 25);
        assert_eq!(config.scheduler().page_size(), 25);
    }

    #[test]
    fn test_oversized_page_is_clamped() {
        let config = HandlerConfig::from_vars(vars(&[
            ("AWS_REGION", "eu-west-1"),
            ("SCHEDULER_RESOURCES_PER_PAGE", "500"),
        ]))
        .unwrap();
        assert_eq!(config.scheduler().page_size(), 100);
    }
}
