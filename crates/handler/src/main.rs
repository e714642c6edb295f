//! Auto start/stop handler
//!
//! Lambda entry point: starts or stops the EC2 instances, RDS instances and
//! EKS node groups carrying a schedule tag, as requested by each invocation.

use lambda_runtime::{service_fn, LambdaEvent};
use scheduler_lib::{AwsProvider, Clients, Dispatcher, InvocationEvent, StructuredLogger};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod invocation;

const HANDLER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json().without_time())
        .init();

    let config = config::HandlerConfig::load()?;
    let scheduler = config.scheduler();
    info!(region = %config.region, "Handler configured");

    let provider = Arc::new(AwsProvider::connect(&config.region, None).await);
    let dispatcher = Dispatcher::new(Clients::from_provider(provider), &scheduler);

    let logger = StructuredLogger::new(config.region.as_str());
    logger.log_startup(HANDLER_VERSION, scheduler.page_size());

    let dispatcher = &dispatcher;
    let logger = &logger;
    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<InvocationEvent>| async move {
            invocation::handle(event, dispatcher, logger).await
        },
    ))
    .await
}
