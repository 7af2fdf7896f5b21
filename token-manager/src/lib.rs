pub mod config;
pub mod connector;
pub mod error;
pub mod helpers;
pub mod pipeline;
pub mod templates;

use config::DeployConfig;
use connector::TezosConnector;
use error::ManagerResult;
use pipeline::DeploymentReport;
use tokio_util::sync::CancellationToken;

/// deploys the token contract, mints the minimum balance and hands the
/// administrator role to the configured target
pub async fn deploy_token(
    config: &DeployConfig,
    cancel: CancellationToken,
) -> ManagerResult<DeploymentReport> {
    config.validate()?;

    let mut connector = TezosConnector::new(config, cancel)?;

    pipeline::run(&mut connector, config).await
}
