//! AWS Lambda entry point for the Allsect site functions
//!
//! Deploy with `cargo lambda build --release --features lambda` and set
//! `ALLSECT_HANDLER` on each function to pick the handler it runs.

use allsect_functions::lambda::{FunctionState, handler};
use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let state = FunctionState::from_env().await?;
    info!("Allsect Lambda starting with handler {}", state.kind);

    let state = &state;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(state, event).await
    }))
    .await
}
