//! Lambda event handling

use lambda_runtime::{Error, LambdaEvent};
use scheduler_lib::{account_id_from_arn, ActionResult, Dispatcher, InvocationEvent, StructuredLogger};
use tracing::warn;

/// Account reported when the function ARN carries none
pub const UNKNOWN_ACCOUNT: &str = "unknown";

/// Account that owns the running function
pub fn invoking_account(function_arn: &str) -> &str {
    account_id_from_arn(function_arn).unwrap_or_else(|| {
        warn!(function_arn = %function_arn, "Function ARN has no account id");
        UNKNOWN_ACCOUNT
    })
}

/// Handle one invocation. Rejected requests come back as a `Failed`
/// envelope; provider errors fail the invocation.
pub async fn handle(
    event: LambdaEvent<InvocationEvent>,
    dispatcher: &Dispatcher,
    logger: &StructuredLogger,
) -> Result<ActionResult, Error> {
    let (payload, context) = event.into_parts();
    let account_id = invoking_account(&context.invoked_function_arn);

    dispatcher
        .dispatch(&payload, account_id)
        .await
        .map_err(|err| {
            logger.log_invocation_error(&err);
            err.into()
        })
}
