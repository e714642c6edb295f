//! RDS instance start/stop
//!
//! The provider has no batch call for databases, so each surviving
//! identifier gets its own start or stop request.

use super::{async_trait, Pipeline};
use crate::error::{ProviderError, Result, SchedulerError};
use crate::filter::{self, Verdict};
use crate::locator::ResourceLocator;
use crate::models::{Automation, ResourceCategory, ResourceRef, TagSelector};
use crate::observability::StructuredLogger;
use crate::provider::{DatabaseApi, DbInstance};
use std::sync::Arc;

pub struct DatabasePipeline {
    locator: ResourceLocator,
    database: Arc<dyn DatabaseApi>,
    logger: StructuredLogger,
}

impl DatabasePipeline {
    pub fn new(
        locator: ResourceLocator,
        database: Arc<dyn DatabaseApi>,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            locator,
            database,
            logger,
        }
    }

    /// Start databases that are fully stopped
    pub async fn start(&self, identifiers: Vec<String>) -> Result<Vec<String>> {
        let pending = self.select(identifiers, filter::db_start_verdict).await?;

        let mut started = Vec::with_capacity(pending.len());
        for identifier in pending {
            let confirmed = self
                .database
                .start_db_instance(&identifier)
                .await
                .map_err(|e| self.failed("StartDBInstance", identifier.clone(), e))?;
            started.push(confirmed);
        }

        self.logger
            .log_transitioned(Automation::Start, ResourceCategory::Rds, &started);
        Ok(started)
    }

    /// Stop available databases, leaving multi-AZ SQL Server and anything
    /// mid-transition alone
    pub async fn stop(&self, identifiers: Vec<String>) -> Result<Vec<String>> {
        let pending = self.select(identifiers, filter::db_stop_verdict).await?;

        let mut stopped = Vec::with_capacity(pending.len());
        for identifier in pending {
            let confirmed = self
                .database
                .stop_db_instance(&identifier)
                .await
                .map_err(|e| self.failed("StopDBInstance", identifier.clone(), e))?;
            stopped.push(confirmed);
        }

        self.logger
            .log_transitioned(Automation::Stop, ResourceCategory::Rds, &stopped);
        Ok(stopped)
    }

    async fn select(
        &self,
        identifiers: Vec<String>,
        verdict: fn(&DbInstance) -> Verdict,
    ) -> Result<Vec<String>> {
        let mut pending = Vec::with_capacity(identifiers.len());

        for identifier in identifiers {
            let db = self
                .database
                .describe_db_instance(&identifier)
                .await
                .map_err(|e| self.failed("DescribeDBInstances", identifier.clone(), e))?;

            self.logger.log_db_inspected(&db);

            match verdict(&db) {
                Verdict::Apply => pending.push(identifier),
                Verdict::Skip(reason) => self.logger.log_skipped(&identifier, &reason),
            }
        }

        Ok(pending)
    }

    fn failed(
        &self,
        operation: &'static str,
        resource: String,
        source: ProviderError,
    ) -> SchedulerError {
        self.logger.log_provider_error(operation, &resource, &source);
        SchedulerError::provider(operation, resource, source)
    }
}

#[async_trait]
impl Pipeline for DatabasePipeline {
    fn category(&self) -> ResourceCategory {
        ResourceCategory::Rds
    }

    async fn run(&self, automation: Automation, selector: &TagSelector) -> Result<Vec<ResourceRef>> {
        let identifiers = self.locator.locate_db_instances(selector).await?;

        let affected = match automation {
            Automation::Start => self.start(identifiers).await?,
            Automation::Stop => self.stop(identifiers).await?,
        };

        Ok(affected.into_iter().map(ResourceRef::DbInstance).collect())
    }
}
